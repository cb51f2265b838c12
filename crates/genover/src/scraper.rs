use crate::parser::{ParseError, parse_first_element, parse_matching_option};
use crate::rules::{Extraction, RuleSet};
use crate::types::{FailureKind, LookupResult, Outcome, Report, Source};

use chrono::Utc;
use reqwest::{Client, StatusCode};
use std::time::Duration;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, thiserror::Error)]
pub enum ScraperError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("Parse error: {0}")]
    ParseError(#[from] ParseError),
}

impl ScraperError {
    pub fn kind(&self) -> FailureKind {
        match self {
            ScraperError::HttpError(e) if e.is_timeout() => FailureKind::Timeout,
            ScraperError::HttpError(_) => FailureKind::Network,
            ScraperError::ParseError(_) => FailureKind::Parse,
        }
    }
}

#[derive(Debug, Clone)]
pub struct WebScraper {
    client: Client,
    rules: RuleSet,
}

impl WebScraper {
    pub fn new() -> Result<Self, ScraperError> {
        Self::with_rules(RuleSet::default(), DEFAULT_TIMEOUT)
    }

    pub fn with_rules(rules: RuleSet, timeout: Duration) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(format!(
                "{}/{}",
                env!("CARGO_PKG_NAME"),
                env!("CARGO_PKG_VERSION")
            ))
            .build()?;

        Ok(Self { client, rules })
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Fetches the page for `source` and extracts its version string.
    ///
    /// A response other than `200 OK` or a page without the target element
    /// yields `Ok(None)`. Transport and rule failures are returned as errors.
    pub async fn lookup(
        &self,
        source: Source,
        species: &str,
    ) -> Result<Option<String>, ScraperError> {
        let rule = self.rules.get(source);
        let url = rule.url_for(species);

        log::info!("Checking {} for {}...", source, species);
        let Some(html) = self.get_html(&url).await? else {
            return Ok(None);
        };

        let extracted = match &rule.extraction {
            Extraction::FirstElement { selector } => parse_first_element(&html, selector)?,
            Extraction::MatchingOption { selector, pattern } => {
                parse_matching_option(&html, selector, species, pattern)?
            }
        };

        Ok(extracted)
    }

    /// Runs [`WebScraper::lookup`] and folds any error into the outcome, so a
    /// failing source never stops the others.
    pub async fn check(&self, source: Source, species: &str) -> LookupResult {
        let outcome = match self.lookup(source, species).await {
            Ok(extracted) => Outcome::from_extracted(extracted),
            Err(e) => {
                log::warn!("{} lookup failed: {}", source, e);
                Outcome::Failed {
                    kind: e.kind(),
                    reason: e.to_string(),
                }
            }
        };

        LookupResult {
            source,
            species: species.to_string(),
            outcome,
        }
    }

    /// Checks every source in `sources`, one after another, in the fixed
    /// Ensembl, NCBI, UCSC order regardless of how `sources` is ordered.
    pub async fn check_sources(&self, species: &str, sources: &[Source]) -> Report {
        let mut selected = sources.to_vec();
        selected.sort();
        selected.dedup();

        let mut results = Vec::with_capacity(selected.len());
        for source in selected {
            results.push(self.check(source, species).await);
        }

        Report {
            species: species.to_string(),
            checked_at: Utc::now(),
            results,
        }
    }

    pub async fn check_all(&self, species: &str) -> Report {
        self.check_sources(species, &Source::ALL).await
    }

    async fn get_html(&self, url: &str) -> Result<Option<String>, ScraperError> {
        log::debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .inspect_err(|e| log::debug!("HTTP error: {e:?}"))?;

        let status = response.status();
        if status != StatusCode::OK {
            log::debug!("{} returned {}", url, status);
            return Ok(None);
        }

        Ok(Some(
            response
                .text()
                .await
                .inspect_err(|e| log::debug!("Decode error: {e:?}"))?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_uses_builtin_rules() {
        let scraper = WebScraper::new().expect("Failed to build scraper");
        assert_eq!(scraper.rules(), &RuleSet::default());
    }

    #[test]
    fn test_with_rules_keeps_overrides() {
        let rules = RuleSet::default().with_base_url(Source::Ucsc, "http://127.0.0.1:9000");
        let scraper = WebScraper::with_rules(rules.clone(), Duration::from_secs(1))
            .expect("Failed to build scraper");
        assert_eq!(scraper.rules(), &rules);
        assert_eq!(
            scraper.rules().get(Source::Ucsc).url_for("Human"),
            "http://127.0.0.1:9000/cgi-bin/hgGateway"
        );
    }
}

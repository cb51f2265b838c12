use std::fs;
use std::path::Path;

use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::parser::{ParseError, compile_pattern, compile_selector};
use crate::types::Source;

pub const ENSEMBL_BASE_URL: &str = "https://www.ensembl.org";
pub const NCBI_BASE_URL: &str = "https://www.ncbi.nlm.nih.gov";
pub const UCSC_BASE_URL: &str = "https://genome.ucsc.edu";

const SPECIES_PLACEHOLDER: &str = "{species}";

#[derive(Debug, thiserror::Error)]
pub enum RulesError {
    #[error("Failed to read rules file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to decode rules file {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Invalid base URL for {source_name}: {url}")]
    InvalidUrl { source_name: Source, url: String },
    #[error("Invalid rule for {source_name}: {error}")]
    Parse {
        source_name: Source,
        #[source]
        error: ParseError,
    },
}

/// How the version string is pulled out of a fetched page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Extraction {
    /// Trimmed text of the first element matching `selector`.
    FirstElement { selector: String },
    /// First capture group of `pattern` in the first `selector` match whose
    /// text contains the species name.
    MatchingOption { selector: String, pattern: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRule {
    pub base_url: String,
    pub path: String,
    #[serde(default = "default_space_delimiter")]
    pub space_delimiter: String,
    pub extraction: Extraction,
}

fn default_space_delimiter() -> String {
    " ".to_string()
}

impl SourceRule {
    pub fn ensembl() -> Self {
        Self {
            base_url: ENSEMBL_BASE_URL.to_string(),
            path: "/species/{species}".to_string(),
            space_delimiter: "_".to_string(),
            extraction: Extraction::FirstElement {
                selector: "p.assembly-version".to_string(),
            },
        }
    }

    pub fn ncbi() -> Self {
        Self {
            base_url: NCBI_BASE_URL.to_string(),
            path: "/genome/?term={species}".to_string(),
            space_delimiter: "+".to_string(),
            extraction: Extraction::FirstElement {
                selector: "span.assembly-name".to_string(),
            },
        }
    }

    pub fn ucsc() -> Self {
        Self {
            base_url: UCSC_BASE_URL.to_string(),
            path: "/cgi-bin/hgGateway".to_string(),
            space_delimiter: default_space_delimiter(),
            extraction: Extraction::MatchingOption {
                selector: "option".to_string(),
                pattern: r"\((.*?)\)".to_string(),
            },
        }
    }

    pub fn url_for(&self, species: &str) -> String {
        let species = species.replace(' ', &self.space_delimiter);
        format!(
            "{}{}",
            self.base_url.trim_end_matches('/'),
            self.path.replace(SPECIES_PLACEHOLDER, &species)
        )
    }

    fn validate(&self, source: Source) -> Result<(), RulesError> {
        Url::parse(&self.base_url).map_err(|_| RulesError::InvalidUrl {
            source_name: source,
            url: self.base_url.clone(),
        })?;

        let parse_error = |error: ParseError| RulesError::Parse {
            source_name: source,
            error,
        };
        match &self.extraction {
            Extraction::FirstElement { selector } => {
                compile_selector(selector).map_err(parse_error)?;
            }
            Extraction::MatchingOption { selector, pattern } => {
                compile_selector(selector).map_err(parse_error)?;
                compile_pattern(pattern).map_err(parse_error)?;
            }
        }
        Ok(())
    }
}

/// One extraction rule per source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleSet {
    pub ensembl: SourceRule,
    pub ncbi: SourceRule,
    pub ucsc: SourceRule,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self {
            ensembl: SourceRule::ensembl(),
            ncbi: SourceRule::ncbi(),
            ucsc: SourceRule::ucsc(),
        }
    }
}

impl RuleSet {
    /// Loads rules from a JSON file. Sources the file leaves out keep their
    /// built-in rule.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, RulesError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| RulesError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let rules: RuleSet = serde_json::from_str(&json).map_err(|source| RulesError::Json {
            path: path.display().to_string(),
            source,
        })?;
        log::debug!("Loaded extraction rules from {}", path.display());
        rules.validate()
    }

    pub fn validate(self) -> Result<Self, RulesError> {
        for source in Source::ALL {
            self.get(source).validate(source)?;
        }
        Ok(self)
    }

    pub fn get(&self, source: Source) -> &SourceRule {
        match source {
            Source::Ensembl => &self.ensembl,
            Source::Ncbi => &self.ncbi,
            Source::Ucsc => &self.ucsc,
        }
    }

    pub fn get_mut(&mut self, source: Source) -> &mut SourceRule {
        match source {
            Source::Ensembl => &mut self.ensembl,
            Source::Ncbi => &mut self.ncbi,
            Source::Ucsc => &mut self.ucsc,
        }
    }

    /// Points `source` at another host, keeping its path and extraction.
    pub fn with_base_url(mut self, source: Source, base_url: impl Into<String>) -> Self {
        self.get_mut(source).base_url = base_url.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_urls() {
        let rules = RuleSet::default();
        assert_eq!(
            rules.get(Source::Ensembl).url_for("Saccharomyces cerevisiae"),
            "https://www.ensembl.org/species/Saccharomyces_cerevisiae"
        );
        assert_eq!(
            rules.get(Source::Ncbi).url_for("Saccharomyces cerevisiae"),
            "https://www.ncbi.nlm.nih.gov/genome/?term=Saccharomyces+cerevisiae"
        );
        assert_eq!(
            rules.get(Source::Ucsc).url_for("Saccharomyces cerevisiae"),
            "https://genome.ucsc.edu/cgi-bin/hgGateway"
        );
    }

    #[test]
    fn test_default_rules_are_valid() {
        assert!(RuleSet::default().validate().is_ok());
    }

    #[test]
    fn test_with_base_url() {
        let rules = RuleSet::default().with_base_url(Source::Ensembl, "http://127.0.0.1:8080/");
        assert_eq!(
            rules.get(Source::Ensembl).url_for("Homo sapiens"),
            "http://127.0.0.1:8080/species/Homo_sapiens"
        );
        assert_eq!(rules.ncbi, SourceRule::ncbi());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let json = r#"{
            "ncbi": {
                "base_url": "https://www.ncbi.nlm.nih.gov",
                "path": "/datasets/genome/?taxon={species}",
                "space_delimiter": "%20",
                "extraction": { "kind": "first_element", "selector": "td.assembly" }
            }
        }"#;
        let rules: RuleSet = serde_json::from_str(json).expect("Failed to decode rules");

        assert_eq!(rules.ensembl, SourceRule::ensembl());
        assert_eq!(rules.ucsc, SourceRule::ucsc());
        assert_eq!(
            rules.ncbi.url_for("Homo sapiens"),
            "https://www.ncbi.nlm.nih.gov/datasets/genome/?taxon=Homo%20sapiens"
        );
        assert_eq!(
            rules.ncbi.extraction,
            Extraction::FirstElement {
                selector: "td.assembly".to_string()
            }
        );
    }

    #[test]
    fn test_validate_rejects_bad_selector() {
        let mut rules = RuleSet::default();
        rules.ucsc.extraction = Extraction::MatchingOption {
            selector: "option[".to_string(),
            pattern: r"\((.*?)\)".to_string(),
        };
        let err = rules.validate().unwrap_err();
        assert!(matches!(
            err,
            RulesError::Parse {
                source_name: Source::Ucsc,
                ..
            }
        ));
    }

    #[test]
    fn test_validate_rejects_bad_base_url() {
        let rules = RuleSet::default().with_base_url(Source::Ncbi, "not a url");
        assert!(matches!(
            rules.validate(),
            Err(RulesError::InvalidUrl {
                source_name: Source::Ncbi,
                ..
            })
        ));
    }
}

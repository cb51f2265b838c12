use regex::Regex;
use scraper::{ElementRef, Html, Selector};

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Invalid CSS selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },
    #[error("Invalid extraction pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

pub(crate) fn compile_selector(selector: &str) -> Result<Selector, ParseError> {
    Selector::parse(selector).map_err(|e| ParseError::InvalidSelector {
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}

pub(crate) fn compile_pattern(pattern: &str) -> Result<Regex, ParseError> {
    Regex::new(pattern).map_err(|source| ParseError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}

fn elem_text(element: ElementRef) -> String {
    element.text().collect::<String>()
}

/// Trimmed text of the first element matching `selector`.
///
/// Returns `None` when nothing matches or the match has no visible text.
pub fn parse_first_element(html: &str, selector: &str) -> Result<Option<String>, ParseError> {
    let selector = compile_selector(selector)?;
    let document = Html::parse_document(html);

    let text = document
        .select(&selector)
        .next()
        .map(|e| elem_text(e).trim().to_string())
        .filter(|t| !t.is_empty());

    Ok(text)
}

/// Scans the elements matching `selector` in document order and returns the
/// first capture group of `pattern` from the first element whose text
/// contains `species`, ignoring case.
///
/// An element that contains the species but yields no non-empty capture is
/// skipped and the scan carries on.
pub fn parse_matching_option(
    html: &str,
    selector: &str,
    species: &str,
    pattern: &str,
) -> Result<Option<String>, ParseError> {
    let selector = compile_selector(selector)?;
    let pattern = compile_pattern(pattern)?;
    let document = Html::parse_document(html);
    let needle = species.to_lowercase();

    let token = document
        .select(&selector)
        .map(elem_text)
        .filter(|text| text.to_lowercase().contains(&needle))
        .find_map(|text| {
            pattern
                .captures(&text)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().trim().to_string())
                .filter(|t| !t.is_empty())
        });

    if token.is_none() {
        log::debug!("No option matched '{}'", species);
    }

    Ok(token)
}

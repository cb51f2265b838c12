mod parser;
pub mod rules;
pub mod scraper;
pub mod types;

pub use parser::ParseError;
pub use rules::{Extraction, RuleSet, RulesError, SourceRule};
pub use scraper::{ScraperError, WebScraper};
pub use types::{
    EmptySpeciesError, FailureKind, LookupResult, NOT_FOUND, Outcome, Report, Source,
    normalize_species,
};

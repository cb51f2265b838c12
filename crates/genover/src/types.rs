use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const NOT_FOUND: &str = "Not found";

#[derive(Debug, thiserror::Error)]
#[error("Invalid source '{0}'. Accepted values: 'ensembl', 'ncbi', 'ucsc'")]
pub struct SourceParseError(String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    Ensembl,
    Ncbi,
    Ucsc,
}

impl Source {
    /// Every source, in the order lookups are reported.
    pub const ALL: [Source; 3] = [Source::Ensembl, Source::Ncbi, Source::Ucsc];
}

impl FromStr for Source {
    type Err = SourceParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ensembl" => Ok(Source::Ensembl),
            "ncbi" => Ok(Source::Ncbi),
            "ucsc" => Ok(Source::Ucsc),
            _ => Err(SourceParseError(s.to_string())),
        }
    }
}

impl Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Source::Ensembl => write!(f, "Ensembl"),
            Source::Ncbi => write!(f, "NCBI"),
            Source::Ucsc => write!(f, "UCSC"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Species name must not be empty")]
pub struct EmptySpeciesError;

/// Trims surrounding whitespace (including the newline of a prompted line)
/// and rejects names that end up empty.
pub fn normalize_species(input: &str) -> Result<String, EmptySpeciesError> {
    let species = input.trim();
    if species.is_empty() {
        return Err(EmptySpeciesError);
    }
    Ok(species.to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Network,
    Timeout,
    Parse,
}

impl Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Timeout => write!(f, "timeout error"),
            FailureKind::Parse => write!(f, "parse error"),
        }
    }
}

/// What a single lookup produced. `Found` always carries non-empty text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Found { version: String },
    NotFound,
    Failed { kind: FailureKind, reason: String },
}

impl Outcome {
    pub fn from_extracted(extracted: Option<String>) -> Self {
        match extracted {
            Some(version) if !version.trim().is_empty() => Outcome::Found {
                version: version.trim().to_string(),
            },
            _ => Outcome::NotFound,
        }
    }

    pub fn version(&self) -> Option<&str> {
        match self {
            Outcome::Found { version } => Some(version),
            _ => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Outcome::Failed { .. })
    }
}

impl Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Found { version } => write!(f, "{version}"),
            Outcome::NotFound => write!(f, "{NOT_FOUND}"),
            Outcome::Failed { kind, reason } => write!(f, "{kind} ({reason})"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupResult {
    pub source: Source,
    pub species: String,
    pub outcome: Outcome,
}

impl Display for LookupResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.source, self.outcome)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub species: String,
    pub checked_at: DateTime<Utc>,
    pub results: Vec<LookupResult>,
}

impl Report {
    pub fn failures(&self) -> usize {
        self.results.iter().filter(|r| r.outcome.is_failed()).count()
    }
}

impl Display for Report {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "Checking for the latest version of {} genome:",
            self.species
        )?;
        for result in &self.results {
            writeln!(f, "{result}")?;
        }
        Ok(())
    }
}

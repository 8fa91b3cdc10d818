//! Domain types for company discovery with strong typing.
//!
//! The discovery pipeline passes a [`SearchTerm`] from validation through to
//! the cache and metric stores, and produces ordered lists of
//! [`CandidateResult`]s.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::discovery::MIN_TERM_CHARS;

/// Normalized (trimmed, lower-cased) company name.
///
/// This is the cache key and the value matched against extracted company
/// names during scoring. Construction enforces the minimum length, so holding
/// a `SearchTerm` means validation already happened. The trimmed input is
/// kept alongside for display; equality and hashing ignore it.
///
/// # Examples
///
/// ```rust
/// use linkscout::domain::SearchTerm;
///
/// let term = SearchTerm::parse("  Goldman Sachs ").unwrap();
/// assert_eq!(term.as_str(), "goldman sachs");
/// assert_eq!(term.original(), "Goldman Sachs");
/// assert!(SearchTerm::parse(" a ").is_none());
/// ```
#[derive(Debug, Clone)]
pub struct SearchTerm {
    normalized: String,
    original: String,
}

impl SearchTerm {
    /// Normalizes `raw` and returns `None` when fewer than two characters
    /// remain after trimming.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.chars().count() < MIN_TERM_CHARS {
            return None;
        }
        Some(Self {
            normalized: trimmed.to_lowercase(),
            original: trimmed.to_string(),
        })
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.normalized
    }

    /// The input as given, minus surrounding whitespace.
    #[must_use]
    pub fn original(&self) -> &str {
        &self.original
    }

    /// The term with every whitespace character removed, as compared against
    /// vanity slugs.
    #[must_use]
    pub fn compact(&self) -> String {
        self.normalized
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect()
    }
}

impl PartialEq for SearchTerm {
    fn eq(&self, other: &Self) -> bool {
        self.normalized == other.normalized
    }
}

impl Eq for SearchTerm {}

impl std::hash::Hash for SearchTerm {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.normalized.hash(state);
    }
}

impl fmt::Display for SearchTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.normalized)
    }
}

impl AsRef<str> for SearchTerm {
    fn as_ref(&self) -> &str {
        &self.normalized
    }
}

/// Where a candidate came from.
///
/// Guesses are synthesized from the input string and were never returned by a
/// search engine, so callers should treat them as lower trust.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultSource {
    #[default]
    Search,
    Guess,
}

impl ResultSource {
    #[must_use]
    pub const fn is_guess(self) -> bool {
        matches!(self, Self::Guess)
    }
}

/// One discovered LinkedIn company page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateResult {
    pub url: String,
    pub company_name: String,
    pub vanity_name: String,
    pub description: String,
    pub confidence: f64,
    #[serde(default)]
    pub source: ResultSource,
}

/// Identity used as the rate-limit key (usually the client IP).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CallerId(String);

impl CallerId {
    pub const ANONYMOUS: &'static str = "anonymous";

    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        let trimmed = id.trim();
        if trimmed.is_empty() {
            Self::anonymous()
        } else {
            Self(trimmed.to_string())
        }
    }

    #[must_use]
    pub fn anonymous() -> Self {
        Self(Self::ANONYMOUS.to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        self.0 == Self::ANONYMOUS
    }
}

impl fmt::Display for CallerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

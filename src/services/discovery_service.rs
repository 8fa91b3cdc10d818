//! Domain service for LinkedIn company discovery.
//!
//! A discovery request runs Validate, RateLimitCheck, CacheCheck,
//! ProviderSearch, CacheWrite, MetricWrite and Respond, in that order.
//! Only validation, rate limiting and total provider failure are surfaced as
//! errors; store problems are logged and absorbed.

use serde::Serialize;
use thiserror::Error;

use crate::constants::discovery::MIN_TERM_CHARS;
use crate::domain::{CallerId, CandidateResult};

/// Errors surfaced to the caller of [`DiscoveryService::discover`].
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("Company name must be at least {MIN_TERM_CHARS} characters")]
    InvalidInput { input: String },

    #[error("Rate limit exceeded. Try again later.")]
    RateLimited {
        search_term: String,
        retry_after_secs: u64,
    },

    #[error("All search providers failed")]
    AllProvidersFailed { search_term: String },

    #[error("{message}")]
    Internal {
        search_term: String,
        message: String,
    },
}

impl DiscoveryError {
    /// The term echoed back in error responses.
    #[must_use]
    pub fn search_term(&self) -> &str {
        match self {
            Self::InvalidInput { input } => input,
            Self::RateLimited { search_term, .. }
            | Self::AllProvidersFailed { search_term }
            | Self::Internal { search_term, .. } => search_term,
        }
    }

    /// Label for the `discovery_requests_total` outcome dimension.
    #[must_use]
    pub const fn outcome(&self) -> &'static str {
        match self {
            Self::InvalidInput { .. } => "invalid",
            Self::RateLimited { .. } => "rate_limited",
            Self::AllProvidersFailed { .. } => "failed",
            Self::Internal { .. } => "error",
        }
    }
}

#[derive(Debug, Clone)]
pub struct DiscoveryRequest {
    pub company_name: Option<String>,
    pub caller: CallerId,
}

impl DiscoveryRequest {
    #[must_use]
    pub fn new(company_name: impl Into<String>, caller: CallerId) -> Self {
        Self {
            company_name: Some(company_name.into()),
            caller,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryOutcome {
    pub results: Vec<CandidateResult>,
    pub cached: bool,
    pub search_term: String,
    /// Provider that produced `results`; `None` for cache hits.
    #[serde(skip)]
    pub provider: Option<&'static str>,
}

#[async_trait::async_trait]
pub trait DiscoveryService: Send + Sync {
    /// Runs one discovery request through the full pipeline.
    ///
    /// # Errors
    ///
    /// - [`DiscoveryError::InvalidInput`] when the name is missing or shorter
    ///   than two characters after trimming. No provider is called.
    /// - [`DiscoveryError::RateLimited`] when the caller exhausted its window.
    /// - [`DiscoveryError::AllProvidersFailed`] when no provider answered and
    ///   the guess fallback is disabled.
    async fn discover(&self, request: DiscoveryRequest) -> Result<DiscoveryOutcome, DiscoveryError>;

    /// Names of the providers in the order they are tried.
    fn provider_names(&self) -> Vec<&'static str>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_and_echo() {
        let err = DiscoveryError::InvalidInput {
            input: "a".to_string(),
        };
        assert_eq!(err.to_string(), "Company name must be at least 2 characters");
        assert_eq!(err.search_term(), "a");
        assert_eq!(err.outcome(), "invalid");

        let err = DiscoveryError::RateLimited {
            search_term: "stripe".to_string(),
            retry_after_secs: 3600,
        };
        assert_eq!(err.search_term(), "stripe");
    }
}

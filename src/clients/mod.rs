//! Web-search API clients.
//!
//! Every client normalizes its provider's response into [`RawHit`]s, keeps the
//! top few, and hands them to the scorer. The orchestrator only sees the
//! [`SearchProvider`] trait, so the chain order is pure configuration.

pub mod brave;
pub mod google_cse;
pub mod serpapi;

use reqwest::{Client, Response, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::SearchConfig;
use crate::domain::{CandidateResult, SearchTerm};
use crate::services::scoring::score_hits;

pub use brave::BraveClient;
pub use google_cse::GoogleCseClient;
pub use serpapi::SerpApiClient;

const ERROR_BODY_PREVIEW_CHARS: usize = 512;

/// One organic result as returned by a search API, before any filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawHit {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

/// Failures a single provider can report. All of them are recoverable: the
/// orchestrator logs the error and moves on to the next provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("{provider}: missing API credentials")]
    MissingCredentials { provider: &'static str },

    #[error("{provider}: credentials rejected (HTTP {status})")]
    Unauthorized { provider: &'static str, status: u16 },

    #[error("{provider}: upstream rate limit reached")]
    RateLimited { provider: &'static str },

    #[error("{provider}: HTTP {status}: {body}")]
    Http {
        provider: &'static str,
        status: u16,
        body: String,
    },

    #[error("{provider}: request timed out")]
    Timeout { provider: &'static str },

    #[error("{provider}: transport error: {source}")]
    Transport {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{provider}: malformed response: {message}")]
    Malformed {
        provider: &'static str,
        message: String,
    },
}

impl ProviderError {
    #[must_use]
    pub fn from_reqwest(provider: &'static str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout { provider }
        } else if err.is_decode() {
            Self::Malformed {
                provider,
                message: err.to_string(),
            }
        } else {
            Self::Transport {
                provider,
                source: err,
            }
        }
    }

    /// Short label used as a metrics dimension.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::MissingCredentials { .. } => "missing_credentials",
            Self::Unauthorized { .. } => "unauthorized",
            Self::RateLimited { .. } => "rate_limited",
            Self::Http { .. } => "http",
            Self::Timeout { .. } => "timeout",
            Self::Transport { .. } => "transport",
            Self::Malformed { .. } => "malformed",
        }
    }
}

/// A source of LinkedIn company candidates for a search term.
#[async_trait::async_trait]
pub trait SearchProvider: Send + Sync {
    /// Stable identifier, used in logs, metrics and the metric table.
    fn name(&self) -> &'static str;

    /// Returns scored candidates, best first. An empty list is a valid answer
    /// and makes the orchestrator try the next provider.
    ///
    /// # Errors
    ///
    /// Any [`ProviderError`]; none of them are retried.
    async fn search(&self, term: &SearchTerm) -> Result<Vec<CandidateResult>, ProviderError>;
}

/// Builds the HTTP client shared by all providers so they reuse one
/// connection pool.
pub fn build_shared_http_client(timeout: Duration) -> anyhow::Result<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(concat!("Linkscout/", env!("CARGO_PKG_VERSION")))
        .pool_max_idle_per_host(10)
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build shared HTTP client: {e}"))
}

/// Builds the configured provider chain in `provider_order`, skipping
/// providers whose credentials are missing.
#[must_use]
pub fn providers_from_config(config: &SearchConfig, client: &Client) -> Vec<Arc<dyn SearchProvider>> {
    let max = config.max_results_per_provider;
    let mut chain: Vec<Arc<dyn SearchProvider>> = Vec::new();

    for name in &config.provider_order {
        let provider: Option<Arc<dyn SearchProvider>> = match name.as_str() {
            google_cse::NAME
                if !config.google_api_key.is_empty() && !config.google_cse_cx.is_empty() =>
            {
                Some(Arc::new(GoogleCseClient::with_shared_client(
                    client.clone(),
                    config.google_api_key.clone(),
                    config.google_cse_cx.clone(),
                    max,
                )))
            }
            brave::NAME if !config.brave_api_key.is_empty() => Some(Arc::new(
                BraveClient::with_shared_client(client.clone(), config.brave_api_key.clone(), max),
            )),
            serpapi::NAME if !config.serpapi_key.is_empty() => Some(Arc::new(
                SerpApiClient::with_shared_client(client.clone(), config.serpapi_key.clone(), max),
            )),
            _ => None,
        };

        match provider {
            Some(provider) => chain.push(provider),
            None => warn!(provider = %name, "Search provider skipped: missing credentials"),
        }
    }

    info!(
        providers = ?chain.iter().map(|p| p.name()).collect::<Vec<_>>(),
        "Search provider chain configured"
    );
    chain
}

/// Maps non-2xx responses onto the provider error taxonomy.
pub(crate) async fn check_status(
    provider: &'static str,
    response: Response,
) -> Result<Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(ProviderError::Unauthorized {
            provider,
            status: status.as_u16(),
        }),
        StatusCode::TOO_MANY_REQUESTS => Err(ProviderError::RateLimited { provider }),
        _ => {
            let body = response.text().await.unwrap_or_default();
            Err(ProviderError::Http {
                provider,
                status: status.as_u16(),
                body: body.chars().take(ERROR_BODY_PREVIEW_CHARS).collect(),
            })
        }
    }
}

pub(crate) fn require_key(provider: &'static str, key: &str) -> Result<(), ProviderError> {
    if key.trim().is_empty() {
        return Err(ProviderError::MissingCredentials { provider });
    }
    Ok(())
}

/// Keeps the provider's top `max_results` hits and scores them.
pub(crate) fn into_candidates(
    mut hits: Vec<RawHit>,
    max_results: usize,
    term: &SearchTerm,
) -> Vec<CandidateResult> {
    hits.truncate(max_results);
    score_hits(&hits, term)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(url: &str) -> RawHit {
        RawHit {
            title: "Acme | LinkedIn".to_string(),
            url: url.to_string(),
            snippet: String::new(),
        }
    }

    fn response(status: u16, body: impl Into<String>) -> Response {
        Response::from(
            axum::http::Response::builder()
                .status(status)
                .body(body.into())
                .unwrap(),
        )
    }

    #[tokio::test]
    async fn test_check_status_passes_success_through() {
        let ok = check_status("brave", response(200, r#"{"web":{}}"#))
            .await
            .unwrap();
        assert_eq!(ok.status(), StatusCode::OK);
        assert_eq!(ok.text().await.unwrap(), r#"{"web":{}}"#);
    }

    #[tokio::test]
    async fn test_check_status_maps_auth_and_quota_errors() {
        for status in [401, 403] {
            assert!(matches!(
                check_status("google_cse", response(status, "denied")).await,
                Err(ProviderError::Unauthorized { provider: "google_cse", status: s }) if s == status
            ));
        }

        assert!(matches!(
            check_status("serpapi", response(429, "slow down")).await,
            Err(ProviderError::RateLimited { provider: "serpapi" })
        ));
    }

    #[tokio::test]
    async fn test_check_status_truncates_error_body() {
        let long_body = "é".repeat(ERROR_BODY_PREVIEW_CHARS + 100);

        match check_status("brave", response(502, long_body)).await {
            Err(ProviderError::Http {
                provider,
                status,
                body,
            }) => {
                assert_eq!(provider, "brave");
                assert_eq!(status, 502);
                assert_eq!(body.chars().count(), ERROR_BODY_PREVIEW_CHARS);
            }
            other => panic!("expected Http error, got {other:?}"),
        }

        assert!(matches!(
            check_status("brave", response(500, "")).await,
            Err(ProviderError::Http { status: 500, ref body, .. }) if body.is_empty()
        ));
    }

    #[test]
    fn test_into_candidates_only_considers_top_hits() {
        let hits = vec![
            hit("https://example.com/a"),
            hit("https://example.com/b"),
            hit("https://example.com/c"),
            hit("https://www.linkedin.com/company/acme/"),
        ];

        let term = SearchTerm::parse("acme").unwrap();
        assert!(into_candidates(hits, 3, &term).is_empty());
    }

    #[test]
    fn test_require_key() {
        assert!(require_key("brave", "abc").is_ok());
        assert!(matches!(
            require_key("brave", "  "),
            Err(ProviderError::MissingCredentials { provider: "brave" })
        ));
    }

    #[test]
    fn test_error_kind_labels() {
        assert_eq!(
            ProviderError::RateLimited { provider: "serpapi" }.kind(),
            "rate_limited"
        );
        assert_eq!(
            ProviderError::Timeout { provider: "brave" }.to_string(),
            "brave: request timed out"
        );
    }

    #[test]
    fn test_providers_from_config_skips_missing_credentials() {
        let config = SearchConfig {
            provider_order: vec![
                "serpapi".to_string(),
                "google_cse".to_string(),
                "brave".to_string(),
            ],
            google_api_key: "key-without-cx".to_string(),
            brave_api_key: "brave-key".to_string(),
            serpapi_key: "serp-key".to_string(),
            ..SearchConfig::default()
        };

        let chain = providers_from_config(&config, &Client::new());
        let names: Vec<_> = chain.iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["serpapi", "brave"]);
    }
}

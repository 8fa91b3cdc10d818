//! `SeaORM` implementation of the `DiscoveryService` trait.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::clients::{ProviderError, SearchProvider};
use crate::config::{CacheConfig, Config};
use crate::db::{NewSearchMetric, Store};
use crate::domain::{CallerId, CandidateResult, SearchTerm};
use crate::services::discovery_service::{
    DiscoveryError, DiscoveryOutcome, DiscoveryRequest, DiscoveryService,
};
use crate::services::guess::{self, GuessGenerator};
use crate::services::rate_limit::{RateLimitDecision, RateLimiter};

/// Result of walking the provider chain.
enum ChainResult {
    Found {
        provider: &'static str,
        results: Vec<CandidateResult>,
    },
    /// At least one provider answered, none had candidates.
    Empty,
    /// Every provider errored, or none is configured.
    Failed,
}

pub struct SeaOrmDiscoveryService {
    store: Store,
    providers: Vec<Arc<dyn SearchProvider>>,
    fallback: Option<GuessGenerator>,
    rate_limiter: RateLimiter,
    provider_timeout: Duration,
    cache: CacheConfig,
}

impl SeaOrmDiscoveryService {
    #[must_use]
    pub fn new(store: Store, providers: Vec<Arc<dyn SearchProvider>>, config: &Config) -> Self {
        let fallback = config.search.guess_fallback.then(GuessGenerator::new);

        Self {
            rate_limiter: RateLimiter::new(store.clone(), config.rate_limit.clone()),
            store,
            providers,
            fallback,
            provider_timeout: config.search.request_timeout(),
            cache: config.cache.clone(),
        }
    }

    /// Runs the pipeline with an explicit clock.
    pub async fn discover_at(
        &self,
        request: DiscoveryRequest,
        now: DateTime<Utc>,
    ) -> Result<DiscoveryOutcome, DiscoveryError> {
        let result = self.run(request, now).await;

        let outcome = match &result {
            Ok(o) if o.cached => "cached",
            Ok(o) if o.provider == Some(guess::NAME) => "guess",
            Ok(_) => "search",
            Err(e) => e.outcome(),
        };
        metrics::counter!("discovery_requests_total", "outcome" => outcome).increment(1);

        result
    }

    async fn run(
        &self,
        request: DiscoveryRequest,
        now: DateTime<Utc>,
    ) -> Result<DiscoveryOutcome, DiscoveryError> {
        let raw = request.company_name.unwrap_or_default();
        let Some(term) = SearchTerm::parse(&raw) else {
            return Err(DiscoveryError::InvalidInput {
                input: raw.trim().to_string(),
            });
        };

        if let RateLimitDecision::Limited { retry_after_secs } =
            self.rate_limiter.check(&request.caller, now).await
        {
            info!(caller = %request.caller, term = %term, "Discovery request rate limited");
            metrics::counter!("discovery_rate_limited_total").increment(1);
            return Err(DiscoveryError::RateLimited {
                search_term: term.to_string(),
                retry_after_secs,
            });
        }

        if let Some(results) = self.read_cache(&term, now).await {
            debug!(term = %term, count = results.len(), "Discovery cache hit");
            metrics::counter!("discovery_cache_hits_total").increment(1);
            return Ok(DiscoveryOutcome {
                results,
                cached: true,
                search_term: term.to_string(),
                provider: None,
            });
        }

        let (provider, results) = match (self.search_providers(&term).await, &self.fallback) {
            (ChainResult::Found { provider, results }, _) => (provider, results),
            (_, Some(fallback)) => {
                let guesses = fallback.generate(&term);
                info!(term = %term, count = guesses.len(), "No search results, answering with guesses");
                (guess::NAME, guesses)
            }
            (ChainResult::Empty, None) => ("none", Vec::new()),
            (ChainResult::Failed, None) => {
                warn!(term = %term, "All search providers failed");
                self.write_metric(&term, 0, &request.caller, "none", now)
                    .await;
                return Err(DiscoveryError::AllProvidersFailed {
                    search_term: term.to_string(),
                });
            }
        };

        if !results.is_empty() && (provider != guess::NAME || self.cache.cache_guesses) {
            self.write_cache(&term, &results, now).await;
        }
        self.write_metric(&term, results.len(), &request.caller, provider, now)
            .await;

        Ok(DiscoveryOutcome {
            results,
            cached: false,
            search_term: term.to_string(),
            provider: Some(provider),
        })
    }

    /// Tries each provider once, in order, until one returns candidates.
    async fn search_providers(&self, term: &SearchTerm) -> ChainResult {
        let mut answered = false;

        for provider in &self.providers {
            let name = provider.name();
            let outcome = tokio::time::timeout(self.provider_timeout, provider.search(term))
                .await
                .unwrap_or_else(|_| Err(ProviderError::Timeout { provider: name }));

            match outcome {
                Ok(results) if !results.is_empty() => {
                    debug!(provider = name, term = %term, count = results.len(), "Provider returned candidates");
                    return ChainResult::Found {
                        provider: name,
                        results,
                    };
                }
                Ok(_) => {
                    debug!(provider = name, term = %term, "Provider returned no company pages");
                    answered = true;
                }
                Err(e) => {
                    warn!(provider = name, term = %term, kind = e.kind(), error = %e, "Search provider failed");
                    metrics::counter!("discovery_provider_failures_total", "provider" => name)
                        .increment(1);
                }
            }
        }

        if answered {
            ChainResult::Empty
        } else {
            ChainResult::Failed
        }
    }

    async fn read_cache(&self, term: &SearchTerm, now: DateTime<Utc>) -> Option<Vec<CandidateResult>> {
        match self.store.get_cached_discovery(term.as_str(), now).await {
            Ok(results) => results,
            Err(e) => {
                warn!(term = %term, error = %e, "Cache read failed, treating as miss");
                None
            }
        }
    }

    async fn write_cache(&self, term: &SearchTerm, results: &[CandidateResult], now: DateTime<Utc>) {
        if let Err(e) = self
            .store
            .cache_discovery(term.as_str(), results, now, self.cache.ttl())
            .await
        {
            warn!(term = %term, error = %e, "Failed to cache discovery results");
        }
    }

    async fn write_metric(
        &self,
        term: &SearchTerm,
        result_count: usize,
        caller: &CallerId,
        provider: &str,
        now: DateTime<Utc>,
    ) {
        let metric = NewSearchMetric {
            search_term: term.as_str(),
            result_count,
            caller_id: (!caller.is_anonymous()).then(|| caller.as_str()),
            provider,
            created_at: now,
        };

        if let Err(e) = self.store.record_search_metric(&metric).await {
            warn!(term = %term, error = %e, "Failed to record search metric");
        }
    }
}

#[async_trait]
impl DiscoveryService for SeaOrmDiscoveryService {
    async fn discover(&self, request: DiscoveryRequest) -> Result<DiscoveryOutcome, DiscoveryError> {
        self.discover_at(request, Utc::now()).await
    }

    fn provider_names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.providers.iter().map(|p| p.name()).collect();
        if self.fallback.is_some() {
            names.push(guess::NAME);
        }
        names
    }
}

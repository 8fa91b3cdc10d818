//! Per-caller request ceiling over a fixed window.
//!
//! Counters live in the `rate_limits` table so every server process sharing
//! the database enforces the same budget. The limiter fails open: when the
//! store is unavailable the request is allowed and a warning is logged.

use chrono::{DateTime, Utc};
use tracing::warn;

use crate::config::RateLimitConfig;
use crate::db::{Store, WindowState};
use crate::domain::CallerId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    Allowed { remaining: u32 },
    Limited { retry_after_secs: u64 },
}

impl RateLimitDecision {
    #[must_use]
    pub const fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed { .. })
    }
}

#[derive(Clone)]
pub struct RateLimiter {
    store: Store,
    config: RateLimitConfig,
}

impl RateLimiter {
    #[must_use]
    pub const fn new(store: Store, config: RateLimitConfig) -> Self {
        Self { store, config }
    }

    /// Counts one request for `caller` and decides whether it may proceed.
    pub async fn check(&self, caller: &CallerId, now: DateTime<Utc>) -> RateLimitDecision {
        let max = self.config.max_requests;

        if !self.config.enabled {
            return RateLimitDecision::Allowed { remaining: max };
        }

        match self
            .store
            .record_request(caller.as_str(), now, max, self.config.window())
            .await
        {
            Ok(WindowState::Started) => RateLimitDecision::Allowed {
                remaining: max.saturating_sub(1),
            },
            Ok(WindowState::Counted { count }) => RateLimitDecision::Allowed {
                remaining: max.saturating_sub(count),
            },
            Ok(WindowState::Exhausted { .. }) => RateLimitDecision::Limited {
                retry_after_secs: self.config.window_seconds,
            },
            Err(e) => {
                warn!(caller = %caller, error = %e, "Rate limit store unavailable, allowing request");
                RateLimitDecision::Allowed { remaining: max }
            }
        }
    }
}

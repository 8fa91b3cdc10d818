pub use super::discovery_cache::Entity as DiscoveryCache;
pub use super::rate_limits::Entity as RateLimits;
pub use super::search_metrics::Entity as SearchMetrics;

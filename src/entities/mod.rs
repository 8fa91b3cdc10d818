pub mod prelude;

pub mod discovery_cache;
pub mod rate_limits;
pub mod search_metrics;

pub mod cache;
pub mod metrics;
pub mod rate_limit;

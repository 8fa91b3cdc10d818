pub mod scoring;

pub mod guess;
pub use guess::GuessGenerator;

pub mod rate_limit;
pub use rate_limit::{RateLimitDecision, RateLimiter};

pub mod discovery_service;
pub mod discovery_service_impl;
pub use discovery_service::{DiscoveryError, DiscoveryOutcome, DiscoveryRequest, DiscoveryService};
pub use discovery_service_impl::SeaOrmDiscoveryService;

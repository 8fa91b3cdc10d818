use serde::{Deserialize, Serialize};

/// Body of `POST /api/discover`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DiscoverBody {
    pub company_name: Option<String>,
    pub health_check: bool,
}

#[derive(Debug, Serialize)]
pub struct HealthCheckResponse {
    pub status: &'static str,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    pub status: &'static str,
    pub timestamp: String,
    pub version: &'static str,
    pub uptime_seconds: u64,
    pub database: bool,
    pub providers: Vec<&'static str>,
    pub confidence_threshold: f64,
}

/// Every non-2xx answer carries the message and the echoed search term.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub error: String,
    pub search_term: String,
}

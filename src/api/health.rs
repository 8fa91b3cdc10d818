use axum::{Json, extract::State, http::StatusCode};
use chrono::Utc;
use std::sync::Arc;
use tracing::warn;

use super::{AppState, HealthStatus};
use crate::db::format_timestamp;

/// `GET /api/health`
pub async fn get_health(State(state): State<Arc<AppState>>) -> (StatusCode, Json<HealthStatus>) {
    let database = match state.store().ping().await {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, "Health check database ping failed");
            false
        }
    };

    let status = if database {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let body = HealthStatus {
        status: if database { "healthy" } else { "degraded" },
        timestamp: format_timestamp(Utc::now()),
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        database,
        providers: state.discovery().provider_names(),
        confidence_threshold: state.config().search.confidence_threshold,
    };

    (status, Json(body))
}

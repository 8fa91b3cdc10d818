use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
    response::{IntoResponse, Response},
};
use chrono::Utc;
use std::sync::Arc;
use tracing::debug;

use super::{AppState, DiscoverBody, HealthCheckResponse};
use crate::api::error::ApiError;
use crate::db::format_timestamp;
use crate::domain::CallerId;
use crate::services::DiscoveryRequest;

/// `POST /api/discover`
pub async fn discover(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<CallerId>,
    payload: Result<Json<DiscoverBody>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(body) = payload.map_err(|rejection| {
        debug!(error = %rejection, "Rejected discover body");
        ApiError::validation(format!("Invalid request body: {}", rejection.body_text()))
    })?;

    // Liveness probes must never consume a caller's budget.
    if body.health_check {
        return Ok(Json(HealthCheckResponse {
            status: "healthy",
            timestamp: format_timestamp(Utc::now()),
        })
        .into_response());
    }

    let request = DiscoveryRequest {
        company_name: body.company_name,
        caller,
    };

    let outcome = state.discovery().discover(request).await?;
    Ok(Json(outcome).into_response())
}

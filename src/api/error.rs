use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use std::fmt;

use super::ErrorBody;
use crate::services::DiscoveryError;

#[derive(Debug)]
pub enum ApiError {
    ValidationError {
        message: String,
        search_term: String,
    },

    RateLimited {
        search_term: String,
        retry_after_secs: u64,
    },

    InternalError {
        message: String,
        search_term: String,
    },
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ValidationError { message, .. } => write!(f, "Validation error: {message}"),
            Self::RateLimited {
                retry_after_secs, ..
            } => write!(f, "Rate limited, retry after {retry_after_secs}s"),
            Self::InternalError { message, .. } => write!(f, "Internal error: {message}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, search_term, retry_after) = match self {
            Self::ValidationError {
                message,
                search_term,
            } => (StatusCode::BAD_REQUEST, message, search_term, None),
            Self::RateLimited {
                search_term,
                retry_after_secs,
            } => (
                StatusCode::TOO_MANY_REQUESTS,
                "Rate limit exceeded. Try again later.".to_string(),
                search_term,
                Some(retry_after_secs),
            ),
            Self::InternalError {
                message,
                search_term,
            } => {
                tracing::error!("Internal error: {}", message);
                (StatusCode::INTERNAL_SERVER_ERROR, message, search_term, None)
            }
        };

        let body = ErrorBody {
            error: message,
            search_term,
        };
        let mut response = (status, Json(body)).into_response();

        if let Some(secs) = retry_after
            && let Ok(value) = HeaderValue::from_str(&secs.to_string())
        {
            response.headers_mut().insert(header::RETRY_AFTER, value);
        }

        response
    }
}

impl From<DiscoveryError> for ApiError {
    fn from(err: DiscoveryError) -> Self {
        let search_term = err.search_term().to_string();
        match err {
            DiscoveryError::InvalidInput { .. } => Self::ValidationError {
                message: err.to_string(),
                search_term,
            },
            DiscoveryError::RateLimited {
                retry_after_secs, ..
            } => Self::RateLimited {
                search_term,
                retry_after_secs,
            },
            DiscoveryError::AllProvidersFailed { .. } | DiscoveryError::Internal { .. } => {
                Self::InternalError {
                    message: err.to_string(),
                    search_term,
                }
            }
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::internal(err.to_string())
    }
}

impl ApiError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError {
            message: msg.into(),
            search_term: String::new(),
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::InternalError {
            message: msg.into(),
            search_term: String::new(),
        }
    }
}

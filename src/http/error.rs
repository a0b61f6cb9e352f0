//! Client-facing error mapping.
//!
//! | Error | Status |
//! |---|---|
//! | `Validation` | 400 |
//! | `BackendUnavailable` | 503 |
//! | `Forward(Unreachable)` | 503 |
//! | `Forward(Rejected)` | upstream status |
//! | `Forward(Unexpected)` | 500 |

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::backend::ForwardError;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or malformed request body.
    #[error("{0}")]
    Validation(String),

    /// The health gate failed; nothing was forwarded.
    #[error("Model serve endpoint is unreachable or unhealthy.")]
    BackendUnavailable,

    #[error(transparent)]
    Forward(#[from] ForwardError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::BackendUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Forward(ForwardError::Unreachable { .. }) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Forward(ForwardError::Rejected { status, .. }) => *status,
            ApiError::Forward(ForwardError::Unexpected { .. }) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::Forward(ForwardError::Unreachable { .. }) => {
                "Failed to connect to model serve endpoint.".to_string()
            }
            ApiError::Forward(ForwardError::Rejected { body, .. }) => {
                format!("Error from model serve: {body}")
            }
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.message() }))).into_response()
    }
}

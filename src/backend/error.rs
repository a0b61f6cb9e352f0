//! Forward error taxonomy.

use axum::http::StatusCode;
use thiserror::Error;

use crate::backend::truncate_body;

/// Why a call to the scoring backend did not yield a usable response.
///
/// `Unreachable` never carries a status code; `Rejected` always does.
#[derive(Debug, Error)]
pub enum ForwardError {
    /// Connection refused, reset, timed out, or body read failed.
    #[error("model serve endpoint {url} unreachable: {reason}")]
    Unreachable { url: String, reason: String },

    /// The backend answered with a non-success status. `body` is the full response text.
    #[error("model serve endpoint {url} returned {status}: {}", truncate_body(.body))]
    Rejected {
        url: String,
        status: StatusCode,
        body: String,
    },

    /// Anything else, e.g. a request that could not be built.
    #[error("unexpected error calling {url}: {reason}")]
    Unexpected { url: String, reason: String },
}

impl ForwardError {
    /// Classify a transport error from the HTTP client.
    pub(crate) fn from_transport(url: &str, err: reqwest::Error) -> Self {
        if err.is_builder() || err.is_redirect() {
            return ForwardError::Unexpected {
                url: url.to_string(),
                reason: err.to_string(),
            };
        }
        let reason = if err.is_timeout() {
            format!("timed out: {err}")
        } else {
            err.to_string()
        };
        ForwardError::Unreachable {
            url: url.to_string(),
            reason,
        }
    }

    /// Upstream status, present only for `Rejected`.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ForwardError::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}

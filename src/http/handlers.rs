//! Endpoint handlers.
//!
//! # Request lifecycle for `POST /predict`
//! ```text
//! Received
//!   → body missing / not structured  → 400 (health never checked)
//!   → health check fails             → 503 (nothing forwarded)
//!   → forward
//!       → success   → count + observe latency → backend body, unchanged
//!       → failure   → upstream status | 503 | 500
//! ```

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde_json::Value;

use crate::backend::Forwarded;
use crate::http::error::ApiError;
use crate::http::server::AppState;

/// Prometheus text exposition format.
const METRICS_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// POST /predict
pub async fn predict(State(state): State<AppState>, body: Bytes) -> Response {
    let response = match forward_prediction(&state, &body).await {
        Ok(response) => response,
        Err(e) => {
            tracing::debug!(status = %e.status(), error = %e, "Prediction request failed");
            e.into_response()
        }
    };
    state
        .telemetry
        .record_request("predict", response.status().as_u16());
    response
}

async fn forward_prediction(state: &AppState, body: &[u8]) -> Result<Response, ApiError> {
    let payload = parse_payload(body)?;

    if !state.health.check().await {
        return Err(ApiError::BackendUnavailable);
    }

    let forwarded = state.forwarder.forward(&payload, state.envelope).await?;
    state.telemetry.record_prediction(forwarded.latency);

    match forwarded.prediction() {
        Ok(value) => tracing::debug!(prediction = value, "Prediction normalized"),
        Err(e) => {
            state.telemetry.record_normalization_failure();
            tracing::warn!(error = %e, "Could not normalize prediction response");
        }
    }

    Ok(passthrough(forwarded))
}

/// Accept only a non-empty JSON object or list.
fn parse_payload(body: &[u8]) -> Result<Value, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(ApiError::Validation("Invalid JSON input: request body is empty".into()));
    }

    let payload: Value = serde_json::from_slice(body)
        .map_err(|e| ApiError::Validation(format!("Invalid JSON input: {e}")))?;

    match &payload {
        Value::Object(map) if !map.is_empty() => Ok(payload),
        Value::Array(items) if !items.is_empty() => Ok(payload),
        _ => Err(ApiError::Validation(
            "Invalid JSON input: expected a non-empty object or list of records".into(),
        )),
    }
}

/// Hand the backend's status and body back to the client untouched.
fn passthrough(forwarded: Forwarded) -> Response {
    let content_type = forwarded
        .content_type
        .unwrap_or_else(|| HeaderValue::from_static("application/json"));
    let mut response = (forwarded.status, forwarded.body).into_response();
    response
        .headers_mut()
        .insert(header::CONTENT_TYPE, content_type);
    response
}

/// GET /metrics
pub async fn metrics(State(state): State<AppState>) -> Response {
    state.health.check().await;
    state.telemetry.record_request("metrics", StatusCode::OK.as_u16());

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, METRICS_CONTENT_TYPE)],
        state.telemetry.render(),
    )
        .into_response()
}

/// GET /health
pub async fn health(State(state): State<AppState>) -> Response {
    let (status, message) = if state.health.check().await {
        (StatusCode::OK, "Model serve endpoint is reachable")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "Model serve endpoint is unreachable")
    };
    state.telemetry.record_request("health", status.as_u16());
    (status, message).into_response()
}

//! Prediction forwarding.
//!
//! # Responsibilities
//! - Wrap the payload in the configured envelope
//! - POST it to the backend invoke endpoint and time the round trip
//! - Classify the outcome and update `BackendStatus`
//!
//! # Design Decisions
//! - Latency spans send through full body receipt
//! - The raw body is kept verbatim; normalization is done on demand
//! - Any error marks the backend unreachable

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::body::Bytes;
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use url::Url;

use crate::backend::error::ForwardError;
use crate::backend::normalize::{normalize_body, NormalizeError};
use crate::backend::status::BackendStatus;
use crate::backend::truncate_body;
use crate::config::Envelope;

/// Field wrapping the payload under `Envelope::Inputs`.
pub const INPUTS_FIELD: &str = "inputs";

/// A successful backend reply.
#[derive(Debug, Clone)]
pub struct Forwarded {
    pub status: StatusCode,
    pub content_type: Option<HeaderValue>,
    pub body: Bytes,
    pub latency: Duration,
}

impl Forwarded {
    /// Scalar prediction extracted from the body.
    pub fn prediction(&self) -> Result<f64, NormalizeError> {
        normalize_body(&self.body)
    }
}

#[derive(Clone)]
pub struct Forwarder {
    client: Client,
    invoke_url: Url,
    timeout: Duration,
    status: Arc<BackendStatus>,
}

impl Forwarder {
    pub fn new(client: Client, invoke_url: Url, timeout: Duration, status: Arc<BackendStatus>) -> Self {
        Self {
            client,
            invoke_url,
            timeout,
            status,
        }
    }

    /// Send one prediction request. No retries.
    pub async fn forward(&self, payload: &Value, envelope: Envelope) -> Result<Forwarded, ForwardError> {
        let ticket = self.status.begin();
        let result = self.send(wrap(payload, envelope)).await;
        self.status.complete(ticket, result.is_ok());

        if let Err(e) = &result {
            match e {
                ForwardError::Rejected { url, status, body } => {
                    tracing::warn!(url = %url, status = %status, body = %truncate_body(body), "Model serve rejected prediction");
                }
                ForwardError::Unreachable { url, reason } => {
                    tracing::error!(url = %url, reason = %reason, "Model serve unreachable");
                }
                ForwardError::Unexpected { url, reason } => {
                    tracing::error!(url = %url, reason = %reason, "Unexpected prediction error");
                }
            }
        }
        result
    }

    async fn send(&self, body: Value) -> Result<Forwarded, ForwardError> {
        let url = self.invoke_url.as_str();
        let start = Instant::now();

        let response = self
            .client
            .post(self.invoke_url.clone())
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| ForwardError::from_transport(url, e))?;

        let status = response.status();
        let content_type = response.headers().get(CONTENT_TYPE).cloned();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ForwardError::from_transport(url, e))?;
        let latency = start.elapsed();

        if !status.is_success() {
            return Err(ForwardError::Rejected {
                url: url.to_string(),
                status,
                body: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }

        tracing::debug!(url = %url, status = %status, latency_ms = latency.as_secs_f64() * 1000.0, "Prediction forwarded");
        Ok(Forwarded {
            status,
            content_type,
            body: bytes,
            latency,
        })
    }

    pub fn invoke_url(&self) -> &Url {
        &self.invoke_url
    }
}

/// Apply `envelope` to `payload`. An object already carrying `inputs` is not wrapped twice.
pub fn wrap(payload: &Value, envelope: Envelope) -> Value {
    match envelope {
        Envelope::None => payload.clone(),
        Envelope::Inputs => match payload {
            Value::Object(map) if map.contains_key(INPUTS_FIELD) => payload.clone(),
            _ => json!({ INPUTS_FIELD: payload }),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_envelope_passes_through() {
        let payload = json!({"total_sqft": 1000.0, "bath": 2.0, "bhk": 3.0});
        assert_eq!(wrap(&payload, Envelope::None), payload);
    }

    #[test]
    fn inputs_envelope_wraps_once() {
        let records = json!([{"total_sqft": 1000.0}]);
        let wrapped = wrap(&records, Envelope::Inputs);
        assert_eq!(wrapped, json!({"inputs": [{"total_sqft": 1000.0}]}));
        assert_eq!(wrap(&wrapped, Envelope::Inputs), wrapped);
    }
}

//! Backend health checking.
//!
//! # Responsibilities
//! - Probe the backend ping endpoint on demand
//! - Update `BackendStatus` with every result
//!
//! # Design Decisions
//! - Short deadline (default 1s); a slow backend counts as down
//! - Never fails: transport errors, timeouts and non-200 are all `false`
//! - Sole gate for whether a proxied prediction is attempted

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, StatusCode};
use url::Url;

use crate::backend::status::BackendStatus;

#[derive(Clone)]
pub struct HealthChecker {
    client: Client,
    ping_url: Url,
    timeout: Duration,
    status: Arc<BackendStatus>,
}

impl HealthChecker {
    pub fn new(client: Client, ping_url: Url, timeout: Duration, status: Arc<BackendStatus>) -> Self {
        Self {
            client,
            ping_url,
            timeout,
            status,
        }
    }

    /// Returns true iff the ping endpoint answered 200 within the deadline.
    pub async fn check(&self) -> bool {
        let ticket = self.status.begin();

        let healthy = match self
            .client
            .get(self.ping_url.clone())
            .header(reqwest::header::USER_AGENT, "model-gateway-health-check")
            .timeout(self.timeout)
            .send()
            .await
        {
            Ok(response) if response.status() == StatusCode::OK => true,
            Ok(response) => {
                tracing::warn!(url = %self.ping_url, status = %response.status(), "Health check failed: non-success status");
                false
            }
            Err(e) if e.is_timeout() => {
                tracing::warn!(url = %self.ping_url, timeout_ms = self.timeout.as_millis() as u64, "Health check failed: timeout");
                false
            }
            Err(e) => {
                tracing::warn!(url = %self.ping_url, error = %e, "Health check failed: connection error");
                false
            }
        };

        self.status.complete(ticket, healthy);
        healthy
    }
}

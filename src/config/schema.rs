//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

/// Root configuration for the inference gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Inbound listener settings.
    pub listener: ListenerConfig,

    /// Model-scoring backend settings.
    pub backend: BackendConfig,

    /// Sample probe loop settings.
    pub probe: ProbeConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Host to bind (e.g., "127.0.0.1").
    pub host: String,

    /// Port to bind.
    pub port: u16,

    /// Total time allowed for one inbound request, in seconds.
    pub request_timeout_secs: u64,

    /// Maximum accepted request body size in bytes.
    pub max_body_size: usize,
}

impl ListenerConfig {
    /// `host:port` string suitable for binding. IPv6 literals are bracketed.
    pub fn bind_address(&self) -> String {
        match self.host.parse::<IpAddr>() {
            Ok(IpAddr::V6(ip)) => format!("[{}]:{}", ip, self.port),
            _ => format!("{}:{}", self.host, self.port),
        }
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5001,
            request_timeout_secs: 30,
            max_body_size: 2 * 1024 * 1024, // 2MB
        }
    }
}

/// How a payload is wrapped before it is sent to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Envelope {
    /// Send the payload verbatim.
    None,
    /// Send `{"inputs": <payload>}`.
    Inputs,
}

/// Model-scoring backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL of the scoring server (e.g., "http://127.0.0.1:5005").
    pub base_url: String,

    /// Liveness path, probed with GET.
    pub ping_path: String,

    /// Prediction path, called with POST.
    pub invoke_path: String,

    /// Health probe timeout in milliseconds.
    pub health_timeout_ms: u64,

    /// Prediction call timeout in seconds.
    pub request_timeout_secs: u64,

    /// Envelope applied to proxied client payloads.
    pub envelope: Envelope,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5005".to_string(),
            ping_path: "/ping".to_string(),
            invoke_path: "/invocations".to_string(),
            health_timeout_ms: 1000,
            request_timeout_secs: 10,
            envelope: Envelope::None,
        }
    }
}

/// Sample probe configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Run the probe loop.
    pub enabled: bool,

    /// Seconds between probe ticks.
    pub interval_secs: u64,

    /// JSON file holding the sample feature records.
    pub sample_path: PathBuf,

    /// Envelope applied to the sample payload.
    pub envelope: Envelope,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: 15,
            sample_path: PathBuf::from("dummy_input.json"),
            envelope: Envelope::Inputs,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` takes precedence.
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}

//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate the backend URL and paths
//! - Validate value ranges (timeouts > 0, ports valid)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::IpAddr;
use thiserror::Error;
use url::{Host, Url};

use crate::config::schema::GatewayConfig;

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("backend.base_url '{0}' is not a valid http(s) URL")]
    InvalidBackendUrl(String),

    #[error("{field} '{value}' must start with '/'")]
    InvalidPath { field: &'static str, value: String },

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("listener.host '{0}' is not an IP address or hostname")]
    InvalidHost(String),
}

/// Check a configuration, collecting every problem found.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    match Url::parse(&config.backend.base_url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => {}
        _ => errors.push(ValidationError::InvalidBackendUrl(
            config.backend.base_url.clone(),
        )),
    }

    for (field, value) in [
        ("backend.ping_path", &config.backend.ping_path),
        ("backend.invoke_path", &config.backend.invoke_path),
    ] {
        if !value.starts_with('/') {
            errors.push(ValidationError::InvalidPath {
                field,
                value: value.clone(),
            });
        }
    }

    let ranges: [(&'static str, u64); 6] = [
        ("listener.port", u64::from(config.listener.port)),
        ("listener.request_timeout_secs", config.listener.request_timeout_secs),
        ("listener.max_body_size", config.listener.max_body_size as u64),
        ("backend.health_timeout_ms", config.backend.health_timeout_ms),
        ("backend.request_timeout_secs", config.backend.request_timeout_secs),
        ("probe.interval_secs", config.probe.interval_secs),
    ];
    for (field, value) in ranges {
        if value == 0 {
            errors.push(ValidationError::Zero(field));
        }
    }

    if !is_valid_host(&config.listener.host) {
        errors.push(ValidationError::InvalidHost(config.listener.host.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// An IP literal (v4 or unbracketed v6) or a domain name; resolution is left to bind.
fn is_valid_host(host: &str) -> bool {
    if host.parse::<IpAddr>().is_ok() {
        return true;
    }
    matches!(Host::parse(host), Ok(Host::Domain(_)))
}

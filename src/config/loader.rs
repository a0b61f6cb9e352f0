//! Configuration loading from disk and the environment.

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::schema::{GatewayConfig, LogFormat};
use crate::config::validation::{validate_config, ValidationError};

/// Backend base URL override.
pub const ENV_BACKEND_URL: &str = "MODEL_SERVE_URL";
/// Listener host override.
pub const ENV_HOST: &str = "GATEWAY_HOST";
/// Listener port override.
pub const ENV_PORT: &str = "GATEWAY_PORT";
/// Probe interval override, in seconds.
pub const ENV_PROBE_INTERVAL: &str = "PROBE_INTERVAL_SECS";
/// Probe sample file override.
pub const ENV_SAMPLE_PATH: &str = "SAMPLE_INPUT_PATH";
/// Log format override (`pretty` or `json`).
pub const ENV_LOG_FORMAT: &str = "GATEWAY_LOG_FORMAT";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("environment variable {name}='{value}' is invalid")]
    Env { name: &'static str, value: String },

    #[error("validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration: optional TOML file, then process environment, then validation.
pub fn load(path: Option<&Path>) -> Result<GatewayConfig, ConfigError> {
    let mut config = match path {
        Some(path) => load_file(path)?,
        None => GatewayConfig::default(),
    };
    apply_env_overrides(&mut config, |name| std::env::var(name).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Parse a TOML file into a configuration without validating it.
pub fn load_file(path: &Path) -> Result<GatewayConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Apply recognized environment overrides using `lookup` to read variables.
pub fn apply_env_overrides<F>(config: &mut GatewayConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup(ENV_BACKEND_URL) {
        config.backend.base_url = url;
    }
    if let Some(host) = lookup(ENV_HOST) {
        config.listener.host = host;
    }
    if let Some(port) = lookup(ENV_PORT) {
        config.listener.port = parse_env(ENV_PORT, port)?;
    }
    if let Some(secs) = lookup(ENV_PROBE_INTERVAL) {
        config.probe.interval_secs = parse_env(ENV_PROBE_INTERVAL, secs)?;
    }
    if let Some(path) = lookup(ENV_SAMPLE_PATH) {
        config.probe.sample_path = PathBuf::from(path);
    }
    if let Some(format) = lookup(ENV_LOG_FORMAT) {
        config.observability.log_format = match format.to_ascii_lowercase().as_str() {
            "json" => LogFormat::Json,
            "pretty" => LogFormat::Pretty,
            _ => {
                return Err(ConfigError::Env {
                    name: ENV_LOG_FORMAT,
                    value: format,
                })
            }
        };
    }
    Ok(())
}

fn parse_env<T: std::str::FromStr>(name: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Env { name, value })
}

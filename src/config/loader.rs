//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;
use std::str::FromStr;

use thiserror::Error;

use crate::config::schema::{GatewayConfig, Strategy};
use crate::config::validation::{validate_config, ValidationError};

pub const LOAD_BALANCER_PORT: &str = "LOAD_BALANCER_PORT";
pub const LOAD_SENSITIVE: &str = "LOAD_SENSITIVE";
pub const BALANCING_STRATEGY: &str = "BALANCING_STRATEGY";
pub const LOAD_POLL_TIMEOUT_MS: &str = "LOAD_POLL_TIMEOUT_MS";
pub const FORWARD_TIMEOUT_SECS: &str = "FORWARD_TIMEOUT_SECS";
pub const BACKEND_RETRY_INTERVAL_SECS: &str = "BACKEND_RETRY_INTERVAL_SECS";
pub const METRICS_ADDRESS: &str = "METRICS_ADDRESS";
pub const LOG_LEVEL: &str = "LOG_LEVEL";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration from an optional TOML file, overlay the process
/// environment, and validate.
pub fn load_config(path: Option<&Path>) -> Result<GatewayConfig, ConfigError> {
    let base = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => GatewayConfig::default(),
    };

    let config = apply_env(base, |key| std::env::var(key).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Overlay environment values onto `config`. `lookup` stands in for the
/// environment so callers can inject their own source.
pub fn apply_env<F>(mut config: GatewayConfig, lookup: F) -> Result<GatewayConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(port) = lookup(LOAD_BALANCER_PORT) {
        config.listener.port = parse_value(LOAD_BALANCER_PORT, &port)?;
    }

    if let Some(flag) = lookup(LOAD_SENSITIVE) {
        config.balancing.strategy = if flag.trim().eq_ignore_ascii_case("true") {
            Strategy::LoadSensitive
        } else {
            Strategy::Weighted
        };
    }

    // An explicit strategy overrides the LOAD_SENSITIVE flag.
    if let Some(strategy) = lookup(BALANCING_STRATEGY) {
        config.balancing.strategy = parse_value(BALANCING_STRATEGY, &strategy)?;
    }

    if let Some(timeout) = lookup(LOAD_POLL_TIMEOUT_MS) {
        config.load_poll.timeout_ms = parse_value(LOAD_POLL_TIMEOUT_MS, &timeout)?;
    }

    if let Some(timeout) = lookup(FORWARD_TIMEOUT_SECS) {
        config.forward.timeout_secs = parse_value(FORWARD_TIMEOUT_SECS, &timeout)?;
    }

    if let Some(interval) = lookup(BACKEND_RETRY_INTERVAL_SECS) {
        config.startup.retry_interval_secs = parse_value(BACKEND_RETRY_INTERVAL_SECS, &interval)?;
    }

    if let Some(address) = lookup(METRICS_ADDRESS).filter(|a| !a.trim().is_empty()) {
        config.observability.metrics_address = Some(address.trim().to_string());
    }

    if let Some(level) = lookup(LOG_LEVEL) {
        config.observability.log_level = level.trim().to_lowercase();
    }

    Ok(config)
}

fn parse_value<T>(key: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: ToString,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        key,
        value: value.to_string(),
        reason: e.to_string(),
    })
}

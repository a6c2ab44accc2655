//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.
//! The backend list itself is not part of the schema: it arrives through the
//! startup gate (see [`crate::lifecycle::startup`]).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration.
    pub listener: ListenerConfig,

    /// Backend selection policy.
    pub balancing: BalancingConfig,

    /// Load query settings (load-sensitive mode only).
    pub load_poll: LoadPollConfig,

    /// Forwarding settings.
    pub forward: ForwardConfig,

    /// Startup gate settings.
    pub startup: StartupConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Port to listen on, all interfaces.
    pub port: u16,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self { port: 80 }
    }
}

/// Selection policy variants. Exactly one is active per deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Cycle through backends in registry order, ignoring weights.
    RoundRobin,
    /// Weighted random draw over static weights.
    #[default]
    Weighted,
    /// Poll every backend's load before each draw.
    LoadSensitive,
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "round_robin" | "round-robin" | "rr" => Ok(Strategy::RoundRobin),
            "weighted" => Ok(Strategy::Weighted),
            "load_sensitive" | "load-sensitive" => Ok(Strategy::LoadSensitive),
            other => Err(format!("unknown balancing strategy '{}'", other)),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::RoundRobin => write!(f, "round_robin"),
            Strategy::Weighted => write!(f, "weighted"),
            Strategy::LoadSensitive => write!(f, "load_sensitive"),
        }
    }
}

/// Backend selection configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BalancingConfig {
    /// Selection policy.
    pub strategy: Strategy,

    /// Lower bound on any effective weight, keeps every backend selectable.
    pub weight_floor: f64,
}

impl Default for BalancingConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::default(),
            weight_floor: 0.01,
        }
    }
}

/// Load query configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoadPollConfig {
    /// Path appended to each backend URL.
    pub path: String,

    /// Per-backend query timeout in milliseconds.
    pub timeout_ms: u64,

    /// Sample recorded when a backend cannot report (worst case).
    pub default_load: f64,
}

impl Default for LoadPollConfig {
    fn default() -> Self {
        Self {
            path: "/load".to_string(),
            timeout_ms: 2000,
            default_load: 1.0,
        }
    }
}

/// Forwarding configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ForwardConfig {
    /// Deadline for the backend to accept the connection and send its
    /// response head, and the longest silence allowed while the body
    /// streams, in seconds.
    pub timeout_secs: u64,

    /// Largest body chunk relayed to the client, in bytes.
    pub chunk_size: usize,
}

impl Default for ForwardConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            chunk_size: 1024,
        }
    }
}

/// Startup gate configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StartupConfig {
    /// Delay between attempts to read the backend list, in seconds.
    pub retry_interval_secs: u64,
}

impl Default for StartupConfig {
    fn default() -> Self {
        Self {
            retry_interval_secs: 10,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Prometheus endpoint bind address. Metrics export is off when unset.
    pub metrics_address: Option<String>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_address: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strategy_parses_aliases() {
        assert_eq!("round_robin".parse::<Strategy>().unwrap(), Strategy::RoundRobin);
        assert_eq!("RR".parse::<Strategy>().unwrap(), Strategy::RoundRobin);
        assert_eq!(" Weighted ".parse::<Strategy>().unwrap(), Strategy::Weighted);
        assert_eq!("load-sensitive".parse::<Strategy>().unwrap(), Strategy::LoadSensitive);
        assert!("least_conn".parse::<Strategy>().is_err());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: GatewayConfig = toml::from_str(
            r#"
            [listener]
            port = 8080

            [balancing]
            strategy = "round_robin"
            "#,
        )
        .unwrap();

        assert_eq!(config.listener.port, 8080);
        assert_eq!(config.balancing.strategy, Strategy::RoundRobin);
        assert_eq!(config.balancing.weight_floor, 0.01);
        assert_eq!(config.load_poll.path, "/load");
        assert_eq!(config.forward.chunk_size, 1024);
        assert_eq!(config.startup.retry_interval_secs, 10);
    }
}

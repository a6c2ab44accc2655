//! Startup orchestration.
//!
//! # Responsibilities
//! - Wait until the backend list is available (the only unbounded retry)
//! - Build the backend registry exactly once
//!
//! # Design Decisions
//! - The gate is decoupled from serving: it only needs a [`BackendSource`]
//!   and a [`RetryPolicy`], so tests can inject both
//! - "Not set" (absent or empty) retries; "set but nothing valid" is fatal

use std::time::Duration;

use thiserror::Error;

use crate::load_balancer::{BackendRegistry, RegistryError};
use crate::resilience::RetryPolicy;

/// Environment variable holding the backend list.
pub const BACKEND_SERVERS: &str = "BACKEND_SERVERS";

/// Error type for startup.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StartupError {
    #[error("'BACKEND_SERVERS' still not set after {0} attempts")]
    Exhausted(u32),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Where the raw backend list comes from.
pub trait BackendSource {
    /// The raw list, or `None` while it is not available yet.
    fn backend_servers(&self) -> Option<String>;
}

/// Reads the backend list from the process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvSource;

impl BackendSource for EnvSource {
    fn backend_servers(&self) -> Option<String> {
        std::env::var(BACKEND_SERVERS).ok()
    }
}

/// Production gate: retry forever, `interval` apart.
pub fn gate_policy(interval: Duration) -> RetryPolicy {
    RetryPolicy::forever(interval)
}

/// Poll `source` under `policy` until it yields a non-empty list.
pub async fn wait_for_backend_servers<S>(source: &S, policy: &RetryPolicy) -> Result<String, StartupError>
where
    S: BackendSource + ?Sized,
{
    policy
        .run(|attempt| async move {
            match source.backend_servers().filter(|raw| !raw.is_empty()) {
                Some(raw) => {
                    tracing::info!(servers = %raw, attempt, "Received {}", BACKEND_SERVERS);
                    Some(raw)
                }
                None => {
                    tracing::warn!(attempt, "Environment variable '{}' is not set", BACKEND_SERVERS);
                    tracing::info!(delay = ?policy.delay(), "Waiting before retrying");
                    None
                }
            }
        })
        .await
        .map_err(StartupError::Exhausted)
}

/// Wait for the backend list, then build the registry once.
pub async fn build_registry<S>(source: &S, policy: &RetryPolicy) -> Result<BackendRegistry, StartupError>
where
    S: BackendSource + ?Sized,
{
    let raw = wait_for_backend_servers(source, policy).await?;
    Ok(BackendRegistry::parse(&raw)?)
}

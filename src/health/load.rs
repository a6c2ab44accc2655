//! Backend load sampling.
//!
//! # Responsibilities
//! - Query each backend's load endpoint before a load-sensitive draw
//! - Degrade any failure to the worst-case sample
//!
//! Every backend is queried concurrently with its own timeout. One slow or
//! unreachable backend never affects the samples of the others.

use std::time::Duration;

use futures_util::future::join_all;
use serde::Deserialize;
use thiserror::Error;

use crate::config::LoadPollConfig;
use crate::load_balancer::backend::BackendDescriptor;
use crate::observability::metrics;
use crate::resilience::{within, TimeoutError};

/// Why a single load query produced no usable sample.
#[derive(Debug, Error)]
enum LoadQueryError {
    #[error(transparent)]
    Timeout(#[from] TimeoutError),

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("unusable load value {0}")]
    OutOfRange(f64),
}

/// Body returned by a backend's load endpoint. Other fields are ignored.
#[derive(Debug, Deserialize)]
struct LoadReport {
    load: Option<f64>,
}

/// Issues load queries against backends.
#[derive(Debug, Clone)]
pub struct LoadPoller {
    client: reqwest::Client,
    path: String,
    timeout: Duration,
    default_load: f64,
}

impl LoadPoller {
    pub fn new(config: &LoadPollConfig) -> Result<Self, reqwest::Error> {
        let timeout = Duration::from_millis(config.timeout_ms);
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .no_proxy()
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(Self {
            client,
            path: config.path.clone(),
            timeout,
            default_load: config.default_load,
        })
    }

    /// One sample per backend, in the same order. Never fails.
    pub async fn sample(&self, backends: &[BackendDescriptor]) -> Vec<f64> {
        join_all(backends.iter().map(|backend| self.sample_one(backend))).await
    }

    async fn sample_one(&self, backend: &BackendDescriptor) -> f64 {
        let load = match self.query(backend).await {
            Ok(Some(load)) => load,
            Ok(None) => {
                tracing::debug!(backend = %backend.url(), "Load report without 'load' field");
                self.default_load
            }
            Err(e) => {
                tracing::warn!(backend = %backend.url(), error = %e, "Load query failed, assuming full load");
                self.default_load
            }
        };

        metrics::record_backend_load(backend.url(), load);
        load
    }

    async fn query(&self, backend: &BackendDescriptor) -> Result<Option<f64>, LoadQueryError> {
        let request = async {
            let report: LoadReport = self
                .client
                .get(backend.target(&self.path))
                .send()
                .await?
                .error_for_status()?
                .json()
                .await?;
            Ok::<_, reqwest::Error>(report)
        };

        let report = within(self.timeout, request).await??;

        match report.load {
            Some(load) if !load.is_finite() || load < 0.0 => Err(LoadQueryError::OutOfRange(load)),
            other => Ok(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_field_is_optional() {
        let report: LoadReport = serde_json::from_str(r#"{"load": 0.42, "cpu": 3}"#).unwrap();
        assert_eq!(report.load, Some(0.42));

        let report: LoadReport = serde_json::from_str(r#"{"status": "ok"}"#).unwrap();
        assert_eq!(report.load, None);
    }

    #[test]
    fn non_numeric_load_is_malformed() {
        assert!(serde_json::from_str::<LoadReport>(r#"{"load": "high"}"#).is_err());
    }

    #[tokio::test]
    async fn unreachable_backend_gets_default_load() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let config = LoadPollConfig {
            timeout_ms: 500,
            default_load: 0.75,
            ..LoadPollConfig::default()
        };
        let poller = LoadPoller::new(&config).unwrap();
        let registry = crate::load_balancer::BackendRegistry::parse(&addr.to_string()).unwrap();

        assert_eq!(poller.sample(registry.backends()).await, vec![0.75]);
    }
}

//! Backend pool management.
//!
//! # Responsibilities
//! - Own the registry and the mutable selection state (cursor, weights)
//! - Refresh effective weights from live load before a load-sensitive draw
//! - Apply the configured strategy to select a backend

use std::sync::Arc;

use crate::config::{BalancingConfig, Strategy};
use crate::health::LoadPoller;
use crate::load_balancer::{
    backend::{BackendDescriptor, BackendRegistry},
    round_robin::RoundRobin,
    weighted::WeightedRandom,
    weights::{adjust, EffectiveWeightSet},
    LoadBalancer,
};
use crate::observability::metrics;

/// Selection state owned by the dispatcher and shared by all requests.
#[derive(Debug)]
pub struct Balancer {
    registry: Arc<BackendRegistry>,
    strategy: Strategy,
    algorithm: Box<dyn LoadBalancer>,
    weights: EffectiveWeightSet,
    weight_floor: f64,
    /// Present only in load-sensitive mode.
    poller: Option<LoadPoller>,
}

impl Balancer {
    /// Build the selection state for `registry`.
    ///
    /// `poller` is required for [`Strategy::LoadSensitive`] and ignored
    /// otherwise. Without one, load-sensitive mode degrades to static weights.
    pub fn new(registry: Arc<BackendRegistry>, config: &BalancingConfig, poller: Option<LoadPoller>) -> Self {
        let algorithm: Box<dyn LoadBalancer> = match config.strategy {
            Strategy::RoundRobin => Box::new(RoundRobin::new()),
            Strategy::Weighted | Strategy::LoadSensitive => Box::new(WeightedRandom::new()),
        };

        let poller = match config.strategy {
            Strategy::LoadSensitive => {
                if poller.is_none() {
                    tracing::warn!("Load-sensitive mode without a load poller, using static weights");
                }
                poller
            }
            _ => None,
        };

        tracing::info!(
            strategy = %config.strategy,
            backends = registry.len(),
            "Balancer initialized"
        );

        Self {
            weights: EffectiveWeightSet::new(registry.static_weights()),
            registry,
            strategy: config.strategy,
            algorithm,
            weight_floor: config.weight_floor,
            poller,
        }
    }

    /// Select the backend for the next request. Never fails: the registry is
    /// non-empty and every weight is positive.
    pub async fn select(&self) -> &BackendDescriptor {
        let weights = match &self.poller {
            Some(poller) => self.refresh(poller).await,
            None => self.weights.snapshot(),
        };

        let index = self.algorithm.next_index(&weights);
        // The registry is never empty, so index 0 always exists.
        let backend = &self.registry.backends()[index.min(self.registry.len() - 1)];

        tracing::debug!(backend = %backend.url(), index, strategy = %self.strategy, "Backend selected");
        metrics::record_backend_selected(backend.url());
        backend
    }

    /// Poll every backend and recompute effective weights. The weights used
    /// for this request's draw are the ones computed here, not a re-read of
    /// the shared set, so concurrent requests cannot swap each other's input.
    async fn refresh(&self, poller: &LoadPoller) -> Vec<f64> {
        let backends = self.registry.backends();
        let samples = poller.sample(backends).await;

        let weights: Vec<f64> = backends
            .iter()
            .zip(&samples)
            .map(|(backend, &load)| adjust(backend.static_weight(), load, self.weight_floor))
            .collect();

        tracing::debug!(?samples, ?weights, "Effective weights refreshed");
        self.weights.store(weights.clone());
        weights
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn registry(&self) -> &BackendRegistry {
        &self.registry
    }

    /// Effective weights as of the most recent refresh.
    pub fn effective_weights(&self) -> Vec<f64> {
        self.weights.snapshot()
    }
}

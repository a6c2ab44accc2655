//! Effective weights.
//!
//! A backend's effective weight is what a single draw actually uses. With
//! static policies it equals the configured weight; in load-sensitive mode it
//! is recomputed per request from a fresh load sample.

use std::sync::RwLock;

/// Combine a static weight and a load sample:
/// `max(floor, static_weight / (1 + load))`.
///
/// For a fixed static weight the result strictly decreases as load grows,
/// until it reaches `floor`, which keeps every backend selectable.
pub fn adjust(static_weight: f64, load: f64, floor: f64) -> f64 {
    let adjusted = static_weight / (1.0 + load);
    if adjusted.is_nan() {
        return floor;
    }
    adjusted.max(floor)
}

/// Current effective weight per backend index, shared across requests.
#[derive(Debug)]
pub struct EffectiveWeightSet {
    weights: RwLock<Vec<f64>>,
}

impl EffectiveWeightSet {
    pub fn new(initial: Vec<f64>) -> Self {
        Self {
            weights: RwLock::new(initial),
        }
    }

    /// Copy of the current weights.
    pub fn snapshot(&self) -> Vec<f64> {
        match self.weights.read() {
            Ok(weights) => weights.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Replace all weights at once.
    pub fn store(&self, next: Vec<f64>) {
        match self.weights.write() {
            Ok(mut weights) => *weights = next,
            Err(poisoned) => *poisoned.into_inner() = next,
        }
    }
}

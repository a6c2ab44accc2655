//! Weighted random load balancing strategy.

use rand::Rng;

use crate::load_balancer::LoadBalancer;

/// Picks each backend with probability `weight / total_weight`.
#[derive(Debug, Default)]
pub struct WeightedRandom;

impl WeightedRandom {
    pub fn new() -> Self {
        Self
    }
}

impl LoadBalancer for WeightedRandom {
    fn next_index(&self, weights: &[f64]) -> usize {
        draw(weights, &mut rand::thread_rng())
    }
}

/// Cumulative-weight draw against a uniform value in `[0, total)`.
///
/// Weights must be positive; the total is recomputed on every call so
/// callers can pass freshly adjusted weights. Finite weights whose sum
/// overflows are rescaled by the largest one, which keeps the proportions.
pub fn draw<R: Rng + ?Sized>(weights: &[f64], rng: &mut R) -> usize {
    let total: f64 = weights.iter().sum();
    if total.is_infinite() && weights.iter().all(|w| w.is_finite()) {
        let largest = weights.iter().copied().fold(0.0, f64::max);
        let scaled: Vec<f64> = weights.iter().map(|w| w / largest).collect();
        return draw(&scaled, rng);
    }
    if weights.len() <= 1 || !total.is_finite() || total <= 0.0 {
        return 0;
    }

    let target = rng.gen_range(0.0..total);
    let mut cumulative = 0.0;
    for (index, weight) in weights.iter().enumerate() {
        cumulative += weight;
        if target < cumulative {
            return index;
        }
    }

    // Float rounding can leave `target` just past the last boundary.
    weights.len() - 1
}

//! Round-robin load balancing strategy.

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::load_balancer::LoadBalancer;

/// Round-robin selector.
/// Stores a shared cursor to rotate through backends; weights are ignored.
#[derive(Debug, Default)]
pub struct RoundRobin {
    counter: AtomicUsize,
}

impl RoundRobin {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LoadBalancer for RoundRobin {
    fn next_index(&self, weights: &[f64]) -> usize {
        let len = weights.len().max(1);
        self.counter.fetch_add(1, Ordering::Relaxed) % len
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_robin() {
        let lb = RoundRobin::new();
        let weights = [1.0, 5.0];

        assert_eq!(lb.next_index(&weights), 0);
        assert_eq!(lb.next_index(&weights), 1);
        assert_eq!(lb.next_index(&weights), 0);
    }

    #[test]
    fn visits_evenly_in_cyclic_order() {
        let lb = RoundRobin::new();
        let weights = [1.0; 3];
        let k = 10;

        let picks: Vec<usize> = (0..k).map(|_| lb.next_index(&weights)).collect();
        assert_eq!(picks, vec![0, 1, 2, 0, 1, 2, 0, 1, 2, 0]);

        for backend in 0..weights.len() {
            let visits = picks.iter().filter(|&&i| i == backend).count();
            assert!(visits == k / 3 || visits == k / 3 + 1);
        }
    }

    #[test]
    fn single_backend() {
        let lb = RoundRobin::new();
        for _ in 0..3 {
            assert_eq!(lb.next_index(&[2.0]), 0);
        }
    }
}

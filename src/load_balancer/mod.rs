//! Load balancing subsystem.
//!
//! # Data Flow
//! ```text
//! BACKEND_SERVERS string
//!     → backend.rs (parse into an ordered BackendRegistry)
//! Request accepted
//!     → pool.rs (Balancer: current effective weights)
//!         - load-sensitive: health/load.rs samples → weights.rs adjust
//!     → Apply load balancing algorithm:
//!         - round_robin.rs (rotate through backends)
//!         - weighted.rs (weighted random draw)
//!     → Return the chosen BackendDescriptor
//! ```
//!
//! # Design Decisions
//! - Registry is immutable after startup
//! - Cursor and effective weights live in one state object owned by the
//!   dispatcher; both are synchronized because requests run concurrently
//! - No backend is ever excluded from selection

pub mod backend;
pub mod pool;
pub mod round_robin;
pub mod weighted;
pub mod weights;

pub use backend::{BackendDescriptor, BackendRegistry, RegistryError};
pub use pool::Balancer;

/// A selection algorithm over a backend list described by its weights.
///
/// `weights` has one positive entry per backend, in registry order. The
/// returned index is always `< weights.len()` for a non-empty slice.
pub trait LoadBalancer: Send + Sync + std::fmt::Debug {
    fn next_index(&self, weights: &[f64]) -> usize;
}

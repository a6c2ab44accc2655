//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     → retries.rs (fixed-delay gate until the backend list is set)
//!
//! Request to backend:
//!     → timeouts.rs (deadline on load queries and forward calls)
//!     → On failure: no retry; the next request re-runs selection
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every external call has a deadline
//! - Failover happens only across requests, never within one

pub mod retries;
pub mod timeouts;

pub use retries::RetryPolicy;
pub use timeouts::{within, TimeoutError};

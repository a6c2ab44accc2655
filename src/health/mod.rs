//! Backend load feedback.
//!
//! # Data Flow
//! ```text
//! Load-sensitive draw requested (load_balancer/pool.rs)
//!     → load.rs (GET <backend>/load on every backend, concurrently)
//!     → one sample per backend, worst case on any failure
//!     → load_balancer/weights.rs (effective weights)
//! ```
//!
//! # Design Decisions
//! - Samples are taken per request; nothing is cached between requests
//! - A failed query is recovered locally and never reaches the client
//! - No backend is ever excluded; a bad sample only lowers its weight

pub mod load;

pub use load::LoadPoller;

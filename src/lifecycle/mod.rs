//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → wait for BACKEND_SERVERS → build registry → serve
//!
//! Shutdown (shutdown.rs):
//!     Signal received → stop accepting → finish in-flight → exit 0
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → trigger graceful shutdown
//! ```

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;

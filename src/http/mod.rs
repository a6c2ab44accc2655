//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, GET routes, dispatch)
//!     → [load balancer picks a backend]
//!     → forward.rs (replay GET, stream the response back)
//!     → response.rs (502 when the backend is unreachable)
//!     → Send to client
//! ```

pub mod forward;
pub mod response;
pub mod server;

pub use forward::{ForwardError, ForwardOutcome, Forwarder};
pub use response::{bad_gateway, BAD_GATEWAY_BODY};
pub use server::HttpServer;

//! Timeout enforcement.
//!
//! Every outbound call (load query, forward) carries its own deadline. What a
//! timeout means is up to the caller: a load query degrades to worst-case
//! load, a forward becomes a 502.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;

/// The wrapped operation did not finish in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("timed out after {0:?}")]
pub struct TimeoutError(pub Duration);

/// Await `future`, giving up after `limit`.
pub async fn within<F: Future>(limit: Duration, future: F) -> Result<F::Output, TimeoutError> {
    tokio::time::timeout(limit, future)
        .await
        .map_err(|_| TimeoutError(limit))
}

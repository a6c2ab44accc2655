//! Retry policy.
//!
//! # Responsibilities
//! - Describe how often and how long to retry an operation
//! - Run an attempt function under that policy
//!
//! Only the startup gate retries. Forwarded requests are never retried:
//! the next request simply runs selection again.

use std::future::Future;
use std::time::Duration;

/// Fixed-delay retry policy with an optional attempt bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    delay: Duration,
    max_attempts: Option<u32>,
}

impl RetryPolicy {
    /// Retry forever with a fixed delay.
    pub fn forever(delay: Duration) -> Self {
        Self {
            delay,
            max_attempts: None,
        }
    }

    /// Give up after `max_attempts` attempts, waiting `delay` in between.
    pub fn bounded(delay: Duration, max_attempts: u32) -> Self {
        Self {
            delay,
            max_attempts: Some(max_attempts),
        }
    }

    pub fn max_attempts(&self) -> Option<u32> {
        self.max_attempts
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Call `attempt` until it yields `Some`, sleeping between tries.
    ///
    /// Returns `Err(attempts)` once a bounded policy is exhausted.
    pub async fn run<T, F, Fut>(&self, mut attempt: F) -> Result<T, u32>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Option<T>>,
    {
        let mut attempts = 0u32;
        loop {
            attempts += 1;
            if let Some(value) = attempt(attempts).await {
                return Ok(value);
            }

            if self.max_attempts.is_some_and(|max| attempts >= max) {
                return Err(attempts);
            }

            tokio::time::sleep(self.delay).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn succeeds_on_third_attempt() {
        let policy = RetryPolicy::forever(Duration::from_secs(10));
        let start = Instant::now();

        let result = policy
            .run(|n| async move { if n == 3 { Some("ready") } else { None } })
            .await;

        assert_eq!(result, Ok("ready"));
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(20) && elapsed < Duration::from_secs(21));
    }

    #[tokio::test(start_paused = true)]
    async fn bounded_policy_gives_up() {
        let policy = RetryPolicy::bounded(Duration::from_secs(1), 4);
        let result: Result<(), u32> = policy.run(|_| async { None }).await;
        assert_eq!(result, Err(4));
    }
}

//! Bounded retry with exponential backoff.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, instrument, warn};

use crate::error::DependencyResult;

/// Retries allowed after the initial attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 2;

/// Sequential retry for transient dependency faults.
///
/// An operation runs at most `max_retries + 1` times. Only transient errors
/// ([`DependencyError::is_transient`](crate::DependencyError::is_transient))
/// are retried; permanent errors and
/// circuit-breaker short-circuits propagate immediately. Before retry `n`
/// the calling task sleeps `2^n` seconds (2s, then 4s with the defaults),
/// suspending only itself, never other callers.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_retries: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RETRIES)
    }
}

impl RetryPolicy {
    /// Creates a policy allowing `max_retries` retries after the first attempt.
    pub fn new(max_retries: u32) -> Self {
        Self { max_retries }
    }

    /// Runs `operation`, retrying transient failures with backoff.
    ///
    /// The closure is invoked once per attempt and must produce a fresh
    /// future each time. On exhaustion the last error propagates.
    #[instrument(skip(self, operation))]
    pub async fn execute<T, F, Fut>(&self, mut operation: F) -> DependencyResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = DependencyResult<T>>,
    {
        let mut attempt = 0u32;
        loop {
            match operation().await {
                Ok(value) => {
                    debug!(attempt = attempt + 1, "call succeeded");
                    return Ok(value);
                }
                Err(error) if error.is_transient() && attempt < self.max_retries => {
                    attempt += 1;
                    let delay = backoff(attempt);
                    warn!(
                        attempt,
                        delay_secs = delay.as_secs(),
                        error = %error,
                        "transient failure, backing off before retry"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(error) => {
                    if error.is_transient() {
                        warn!(attempts = attempt + 1, error = %error, "retries exhausted");
                    } else {
                        debug!(error = %error, "not retryable, propagating");
                    }
                    return Err(error);
                }
            }
        }
    }
}

/// Backoff before retry `attempt`: `2^attempt` seconds.
fn backoff(attempt: u32) -> Duration {
    Duration::from_secs(2u64.saturating_pow(attempt))
}

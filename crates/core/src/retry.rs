//! Bounded retry for transient client failures.
//!
//! [`RetryPolicy::run`] repeats an operation while it fails with a
//! transient [`ClientError`](crate::ClientError), up to `max_retries` extra attempts.
//! Non-transient errors are returned immediately.

use std::time::Duration;

use crate::error::ClientResult;

/// Retry policy applied to a single client call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Extra attempts after the first one
    pub max_retries: u32,
    /// Pause between attempts
    pub backoff: Duration,
}

impl RetryPolicy {
    /// Never retry.
    pub const NONE: RetryPolicy = RetryPolicy {
        max_retries: 0,
        backoff: Duration::ZERO,
    };

    /// Retry exactly once, immediately. Used for cleanup deletes.
    pub const ONCE: RetryPolicy = RetryPolicy {
        max_retries: 1,
        backoff: Duration::ZERO,
    };

    /// Total number of attempts this policy allows
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Execute `operation`, retrying transient failures.
    ///
    /// Returns the first success, the first non-transient error, or the
    /// last transient error once attempts are exhausted.
    pub fn run<T, F>(&self, operation_name: &str, mut operation: F) -> ClientResult<T>
    where
        F: FnMut() -> ClientResult<T>,
    {
        let mut attempt = 0;
        loop {
            match operation() {
                Ok(value) => {
                    if attempt > 0 {
                        tracing::debug!(
                            operation = operation_name,
                            attempt = attempt + 1,
                            "operation succeeded after retry",
                        );
                    }
                    return Ok(value);
                }
                Err(err) if err.is_transient() && attempt < self.max_retries => {
                    tracing::debug!(
                        operation = operation_name,
                        attempt = attempt + 1,
                        max_attempts = self.max_attempts(),
                        error = %err,
                        "transient error, retrying",
                    );
                    if !self.backoff.is_zero() {
                        std::thread::sleep(self.backoff);
                    }
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy::ONCE
    }
}

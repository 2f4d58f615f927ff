//! Retry with exponential backoff for transient upstream failures.

use super::clock::Clock;
use super::provider::DataError;
use std::time::Duration;
use tracing::warn;

/// Attempt ceiling, backoff schedule and retryable-error predicate.
///
/// Delay before attempt k+1 is `base_delay * 2^(k-1)`: 1 s, 2 s, 4 s, 8 s
/// with the defaults. Non-retryable errors are returned immediately.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total calls including the first, not retries after it.
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub retryable: fn(&DataError) -> bool,
}

/// Five attempts in total: the first call plus four retries.
impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_secs(1),
            retryable: DataError::is_rate_limited,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            ..Self::default()
        }
    }

    /// Delay slept after failed attempt `attempt` (0-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(2u32.saturating_pow(attempt))
    }

    /// Run `op` until it succeeds, fails with a non-retryable error, or the
    /// attempt ceiling is reached. The last error is returned on exhaustion.
    pub fn run<T, F>(&self, clock: &dyn Clock, what: &str, mut op: F) -> Result<T, DataError>
    where
        F: FnMut() -> Result<T, DataError>,
    {
        let attempts = self.max_attempts.max(1);
        let mut attempt = 0;
        loop {
            match op() {
                Ok(value) => return Ok(value),
                Err(err) if (self.retryable)(&err) && attempt + 1 < attempts => {
                    let delay = self.delay_for(attempt);
                    warn!(
                        target: "sniper::retry",
                        %what,
                        attempt = attempt + 1,
                        max_attempts = attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "throttled upstream, backing off"
                    );
                    clock.sleep(delay);
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

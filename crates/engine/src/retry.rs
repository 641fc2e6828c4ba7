//! Bounded retry with exponential backoff.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

/// Retry policy for blocking I/O against the API and the stores.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Delay before the first retry; doubles per attempt.
    pub base_delay: Duration,
    /// Upper bound on the delay between attempts.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries, for tests and dry probes.
    #[must_use]
    pub const fn no_retries() -> Self {
        Self {
            max_attempts: 1,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    /// Backoff before the retry following `attempt` (0-based).
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exp = attempt.min(16);
        self.base_delay
            .saturating_mul(2u32.saturating_pow(exp))
            .min(self.max_delay)
    }
}

/// Runs `operation` until it succeeds, the error is not transient, or the
/// policy's attempts are exhausted. The last error is returned unchanged,
/// so callers keep its transient/permanent classification.
pub async fn with_retry<T, E, F, Fut, P>(
    policy: &RetryPolicy,
    is_transient: P,
    mut operation: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: Fn(&E) -> bool,
    E: std::fmt::Display,
{
    let mut attempt = 0;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                attempt += 1;
                if attempt >= policy.max_attempts || !is_transient(&err) {
                    return Err(err);
                }
                let delay = policy.delay_for(attempt - 1);
                warn!(%err, attempt, ?delay, "transient failure, backing off");
                tokio::time::sleep(delay).await;
            }
        }
    }
}

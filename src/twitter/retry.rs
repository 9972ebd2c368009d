//! Bounded backoff for retweet requests.
//!
//! A retweet that fails with a transient error (5xx, connection failure) is
//! reissued after a doubling delay. Throttle and permanent errors end the
//! attempt at once: the rate limit window outlasts any backoff here, and a
//! rejected retweet stays rejected. The poll cycle only sees the final
//! outcome, so one message still costs at most one logical reshare attempt.

use std::future::Future;
use std::time::Duration;

use tracing::debug;

use super::error::TwitterApiError;

/// How many times, and how patiently, a transient failure is retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
    /// Retries after the first request. Zero disables retrying.
    pub max_retries: u32,

    /// Delay before the first retry; each later retry doubles it.
    pub initial_delay: Duration,

    /// Upper bound on any single delay.
    pub max_delay: Duration,
}

impl RetryConfig {
    /// 3 retries after 2s, 4s and 8s.
    pub const DEFAULT: Self = Self {
        max_retries: 3,
        initial_delay: Duration::from_secs(2),
        max_delay: Duration::from_secs(16),
    };

    pub fn new(max_retries: u32, initial_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_retries,
            initial_delay,
            max_delay,
        }
    }

    /// Delay before retry number `retry` (0-indexed), capped at `max_delay`.
    pub fn delay_for_retry(&self, retry: u32) -> Duration {
        let factor = 1u32.checked_shl(retry).unwrap_or(u32::MAX);
        self.initial_delay
            .checked_mul(factor)
            .map_or(self.max_delay, |d| d.min(self.max_delay))
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Runs `request`, retrying it while it fails with a transient error.
///
/// Returns the first success, the first throttle or permanent error, or the
/// last transient error once `config.max_retries` retries are spent.
pub async fn retry_transient<T, F, Fut>(
    config: RetryConfig,
    mut request: F,
) -> Result<T, TwitterApiError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, TwitterApiError>>,
{
    let mut retry = 0;
    loop {
        match request().await {
            Err(e) if e.kind.is_retriable() && retry < config.max_retries => {
                let delay = config.delay_for_retry(retry);
                retry += 1;
                debug!(retry, ?delay, error = %e, "Transient Twitter error, backing off");
                tokio::time::sleep(delay).await;
            }
            outcome => return outcome,
        }
    }
}

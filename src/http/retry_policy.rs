use reqwest::StatusCode;
use std::time::Duration;

/// Every backoff delay is the previous one times this factor.
pub const BACKOFF_MULTIPLIER: u32 = 2;

/// Upper bound for a single backoff delay.
pub const MAX_BACKOFF_DELAY: Duration = Duration::from_secs(30);

/// Bounded retry schedule for outbound HTTP requests.
///
/// `max_retries` counts retries after the first attempt, so a policy with
/// `max_retries = 3` performs at most four requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(1))
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
            max_delay: MAX_BACKOFF_DELAY,
        }
    }

    /// A policy that gives up after the first attempt.
    pub fn no_retry() -> Self {
        Self::new(0, Duration::ZERO)
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Delay to sleep before retry number `retry` (0-based).
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = BACKOFF_MULTIPLIER.checked_pow(retry).unwrap_or(u32::MAX);
        self.base_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }

    /// Whether another attempt is allowed after `attempts_made` requests.
    pub fn has_attempts_left(&self, attempts_made: u32) -> bool {
        attempts_made < self.max_attempts()
    }

    /// 5xx responses are retried; 4xx and everything else are final.
    pub fn is_retryable_status(status: StatusCode) -> bool {
        status.is_server_error()
    }

    /// Timeouts and connection failures are retried; malformed requests are not.
    pub fn is_retryable_transport(err: &reqwest::Error) -> bool {
        !err.is_builder() && !err.is_redirect()
    }
}

//! Retry policy
//!
//! Decides whether a failed attempt is retried and how long to wait first

use crate::config::ApiClientConfig;
use crate::utils::error::ApiError;
use rand::Rng;
use std::time::Duration;

/// Hard ceiling for computed delays
pub const MAX_RETRY_DELAY: Duration = Duration::from_millis(30_000);

/// Retry configuration
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Maximum attempts, first attempt included
    pub max_attempts: u32,
    /// Base delay, doubled per attempt
    pub base_delay: Duration,
    /// Maximum delay for computed backoff
    pub max_delay: Duration,
    /// Add up to 10% random delay
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(1000),
            max_delay: MAX_RETRY_DELAY,
            jitter: false,
        }
    }
}

impl RetryPolicy {
    pub fn from_config(config: &ApiClientConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            base_delay: config.retry_delay(),
            max_delay: config.max_retry_delay().min(MAX_RETRY_DELAY),
            jitter: config.jitter,
        }
    }

    /// Copy with per-call overrides applied
    pub fn with_overrides(&self, max_attempts: Option<u32>, base_delay: Option<Duration>) -> Self {
        Self {
            max_attempts: max_attempts.map(|n| n.max(1)).unwrap_or(self.max_attempts),
            base_delay: base_delay.unwrap_or(self.base_delay),
            ..self.clone()
        }
    }

    /// Whether the call should be attempted again after `attempt` (1-based) failed
    ///
    /// Validation errors are terminal: the same request would fail the same way.
    pub fn should_retry(&self, error: &ApiError, attempt: u32) -> bool {
        error.is_retryable() && attempt < self.max_attempts
    }

    /// Delay before the attempt following `attempt`
    ///
    /// `min(2^attempt * base_delay, max_delay)`; a server hint is used as-is.
    pub fn next_delay(&self, attempt: u32, retry_after: Option<Duration>) -> Duration {
        if let Some(hint) = retry_after {
            return hint;
        }

        let cap_ms = duration_ms(self.max_delay);
        let factor = 1u64.checked_shl(attempt).unwrap_or(u64::MAX);
        let mut delay_ms = duration_ms(self.base_delay).saturating_mul(factor).min(cap_ms);

        if self.jitter && delay_ms > 0 {
            let spread = (delay_ms / 10).max(1);
            delay_ms = delay_ms.saturating_add(rand::thread_rng().gen_range(0..=spread)).min(cap_ms);
        }

        Duration::from_millis(delay_ms)
    }
}

fn duration_ms(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

//! Backoff scheduling for poll loops.
//!
//! A refresh cycle never retries itself beyond its single auth retry; the
//! poll loop that schedules cycles decides how long to wait after a
//! retryable failure. [`RetryStrategy`] computes those delays.

use std::time::Duration;

/// Backoff schedule for consecutive failed cycles.
#[derive(Debug, Clone)]
pub struct RetryStrategy {
    /// Base delay between retries in seconds.
    pub base_delay_secs: u64,
    /// Whether to use exponential backoff.
    pub exponential_backoff: bool,
    /// Maximum delay between retries in seconds.
    pub max_delay_secs: u64,
}

impl RetryStrategy {
    /// Creates a new backoff schedule with the given base delay.
    pub fn new(base_delay_secs: u64) -> Self {
        Self {
            base_delay_secs,
            exponential_backoff: true,
            max_delay_secs: 3600,
        }
    }

    /// Fixed-delay schedule without backoff.
    pub fn fixed(delay_secs: u64) -> Self {
        Self {
            base_delay_secs: delay_secs,
            exponential_backoff: false,
            max_delay_secs: delay_secs,
        }
    }

    /// Sets the maximum delay.
    pub fn with_max_delay(mut self, secs: u64) -> Self {
        self.max_delay_secs = secs;
        self
    }

    /// Calculates the delay before the given attempt number (1-based).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let delay = if self.exponential_backoff {
            self.base_delay_secs
                .saturating_mul(2u64.saturating_pow(attempt.saturating_sub(1)))
        } else {
            self.base_delay_secs
        };

        Duration::from_secs(delay.min(self.max_delay_secs))
    }
}

impl Default for RetryStrategy {
    fn default() -> Self {
        Self::new(60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exponential_backoff() {
        let strategy = RetryStrategy::new(1);

        assert_eq!(strategy.delay_for_attempt(1), Duration::from_secs(1));
        assert_eq!(strategy.delay_for_attempt(2), Duration::from_secs(2));
        assert_eq!(strategy.delay_for_attempt(3), Duration::from_secs(4));
        assert_eq!(strategy.delay_for_attempt(4), Duration::from_secs(8));
    }

    #[test]
    fn test_max_delay_cap() {
        let strategy = RetryStrategy::new(10).with_max_delay(60);

        assert_eq!(strategy.delay_for_attempt(5), Duration::from_secs(60));
    }

    #[test]
    fn test_fixed_delay() {
        let strategy = RetryStrategy::fixed(30);

        assert_eq!(strategy.delay_for_attempt(1), Duration::from_secs(30));
        assert_eq!(strategy.delay_for_attempt(7), Duration::from_secs(30));
    }

    #[test]
    fn test_huge_attempt_does_not_overflow() {
        let strategy = RetryStrategy::new(60);
        assert_eq!(strategy.delay_for_attempt(64), Duration::from_secs(3600));
    }
}

//! Retry policy for transient failures.
use std::time::Duration;

/// Fixed or growing delay between attempts, optionally capped.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total number of attempts (first one included). `None` retries forever.
    pub max_attempts: Option<u32>,
    /// Delay before the first retry.
    pub delay: Duration,
    /// Factor applied to the delay after each retry. `1.0` keeps it fixed.
    pub backoff: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: Some(10),
            delay: Duration::from_secs(10),
            backoff: 1.0,
        }
    }
}

impl RetryPolicy {
    /// Retry forever with a fixed delay.
    pub fn unbounded(delay: Duration) -> Self {
        Self {
            max_attempts: None,
            delay,
            backoff: 1.0,
        }
    }

    /// Whether another attempt is allowed once `attempts` have failed.
    pub fn allows(&self, attempts: u32) -> bool {
        self.max_attempts.map_or(true, |max| attempts < max)
    }

    /// Delay to wait after the `attempt`-th failure (starting at 1).
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        let factor = self.backoff.max(1.0).powi(exponent);
        Duration::try_from_secs_f64(self.delay.as_secs_f64() * factor).unwrap_or(Duration::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounded() {
        let policy = RetryPolicy {
            max_attempts: Some(3),
            ..Default::default()
        };
        assert!(policy.allows(1));
        assert!(policy.allows(2));
        assert!(!policy.allows(3));
    }

    #[test]
    fn unbounded() {
        let policy = RetryPolicy::unbounded(Duration::from_secs(10));
        assert!(policy.allows(u32::MAX));
        assert_eq!(policy.delay_after(1000), Duration::from_secs(10));
    }

    #[test]
    fn backoff() {
        let policy = RetryPolicy {
            max_attempts: None,
            delay: Duration::from_secs(1),
            backoff: 2.0,
        };
        assert_eq!(policy.delay_after(1), Duration::from_secs(1));
        assert_eq!(policy.delay_after(2), Duration::from_secs(2));
        assert_eq!(policy.delay_after(4), Duration::from_secs(8));
        assert_eq!(policy.delay_after(u32::MAX), Duration::MAX);
    }
}

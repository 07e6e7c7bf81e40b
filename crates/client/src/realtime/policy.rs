//! Reconnect policies.
//!
//! The store never invents retry timing. After an unexpected drop it asks the
//! injected policy for the delay before the next attempt; `None` means give up.

use std::time::Duration;

pub trait ReconnectPolicy {
    /// Delay before retry number `attempt` (0-based), or `None` to stop retrying.
    fn next_delay(&self, attempt: u32) -> Option<Duration>;
}

/// Never retry. A drop surfaces as an error state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoReconnect;

impl ReconnectPolicy for NoReconnect {
    fn next_delay(&self, _attempt: u32) -> Option<Duration> {
        None
    }
}

/// Exponential backoff, built from explicit configuration only.
#[derive(Debug, Clone, PartialEq)]
pub struct ExponentialBackoff {
    /// Delay before the first retry
    pub initial: Duration,
    /// Upper bound for any single delay
    pub max: Duration,
    /// Growth factor between attempts
    pub multiplier: f64,
    /// Maximum number of retries (0 = unlimited)
    pub max_attempts: u32,
}

impl ExponentialBackoff {
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let millis = self.initial.as_millis() as f64 * self.multiplier.powi(attempt as i32);
        let capped = millis.min(self.max.as_millis() as f64);
        Duration::from_millis(capped as u64)
    }
}

impl ReconnectPolicy for ExponentialBackoff {
    fn next_delay(&self, attempt: u32) -> Option<Duration> {
        if self.max_attempts > 0 && attempt >= self.max_attempts {
            return None;
        }
        Some(self.delay_for_attempt(attempt))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backoff() -> ExponentialBackoff {
        ExponentialBackoff {
            initial: Duration::from_millis(100),
            max: Duration::from_millis(350),
            multiplier: 2.0,
            max_attempts: 4,
        }
    }

    #[test]
    fn no_reconnect_always_gives_up() {
        assert_eq!(NoReconnect.next_delay(0), None);
        assert_eq!(NoReconnect.next_delay(7), None);
    }

    #[test]
    fn delays_grow_then_cap() {
        let policy = backoff();
        assert_eq!(policy.next_delay(0), Some(Duration::from_millis(100)));
        assert_eq!(policy.next_delay(1), Some(Duration::from_millis(200)));
        assert_eq!(policy.next_delay(2), Some(Duration::from_millis(350)));
        assert_eq!(policy.next_delay(3), Some(Duration::from_millis(350)));
    }

    #[test]
    fn stops_after_max_attempts() {
        assert_eq!(backoff().next_delay(4), None);
    }

    #[test]
    fn zero_max_attempts_is_unlimited() {
        let policy = ExponentialBackoff {
            max_attempts: 0,
            ..backoff()
        };
        assert_eq!(policy.next_delay(1000), Some(Duration::from_millis(350)));
    }
}

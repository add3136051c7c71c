//! # Discovery retry
//!
//! Fibonacci backoff for the read-only discovery calls (system lookup and
//! virtual media enumeration). Mutating calls are never retried: a repeated
//! insert or reset is not safe to replay against a BMC.
//!
//! The default policy makes a single attempt.

use std::time::Duration;

/// Fibonacci backoff calculator
///
/// Each delay is the sum of the previous two, starting at `min` twice and
/// capped at `max`: with 1s/10s the sequence is 1s, 1s, 2s, 3s, 5s, 8s, 10s.
#[derive(Debug, Clone)]
pub struct FibonacciBackoff {
    prev: Duration,
    current: Duration,
    max: Duration,
}

impl FibonacciBackoff {
    #[must_use]
    pub fn new(min: Duration, max: Duration) -> Self {
        Self {
            prev: Duration::ZERO,
            current: min,
            max,
        }
    }

    /// Get the next backoff duration and advance the sequence
    pub fn next_backoff(&mut self) -> Duration {
        let result = self.current;
        let next = self.prev + self.current;
        self.prev = self.current;
        self.current = std::cmp::min(next, self.max);
        result
    }
}

/// How often a discovery call is attempted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Values below 1 behave as 1.
    pub max_attempts: u32,
    pub min_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::none()
    }
}

impl RetryPolicy {
    /// One attempt, no retry
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            min_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(10),
        }
    }

    /// `max_attempts` attempts with the default 1s..10s backoff
    pub fn attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            ..Self::none()
        }
    }

    #[must_use]
    pub fn with_delays(mut self, min_delay: Duration, max_delay: Duration) -> Self {
        self.min_delay = min_delay;
        self.max_delay = max_delay;
        self
    }

    pub(crate) fn effective_attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    pub(crate) fn backoff(&self) -> FibonacciBackoff {
        FibonacciBackoff::new(self.min_delay, self.max_delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(n: u64) -> Duration {
        Duration::from_secs(n)
    }

    #[test]
    fn test_fibonacci_backoff_sequence() {
        let mut backoff = FibonacciBackoff::new(secs(1), secs(10));

        assert_eq!(backoff.next_backoff(), secs(1));
        assert_eq!(backoff.next_backoff(), secs(1));
        assert_eq!(backoff.next_backoff(), secs(2));
        assert_eq!(backoff.next_backoff(), secs(3));
        assert_eq!(backoff.next_backoff(), secs(5));
        assert_eq!(backoff.next_backoff(), secs(8));
        assert_eq!(backoff.next_backoff(), secs(10)); // max
        assert_eq!(backoff.next_backoff(), secs(10));
    }

    #[test]
    fn test_default_policy_is_single_attempt() {
        assert_eq!(RetryPolicy::default().effective_attempts(), 1);
        assert_eq!(RetryPolicy::attempts(0).effective_attempts(), 1);
        assert_eq!(RetryPolicy::attempts(4).effective_attempts(), 4);
    }
}

//! Retry policy and exponential backoff schedule.

use std::time::Duration;

/// Bounded retry policy for SSH connection attempts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Zero is treated as one.
    pub max_attempts: u32,
    /// Delay slept after the first retryable failure.
    pub initial_delay: Duration,
    /// Multiplier applied to the delay after each retryable failure.
    pub backoff_factor: f64,
}

impl RetryPolicy {
    /// Attempt budget, never less than one.
    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Delays to sleep before attempt 2, 3, … in order.
    #[must_use]
    pub fn backoff(&self) -> Backoff {
        Backoff {
            next: self.initial_delay,
            factor: self.backoff_factor,
        }
    }
}

/// Infinite iterator of exponentially growing delays.
///
/// Saturates at `Duration::MAX` instead of panicking on overflow.
#[derive(Debug, Clone)]
pub struct Backoff {
    next: Duration,
    factor: f64,
}

impl Iterator for Backoff {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        let current = self.next;
        self.next = Duration::try_from_secs_f64(current.as_secs_f64() * self.factor)
            .unwrap_or(Duration::MAX);
        Some(current)
    }
}

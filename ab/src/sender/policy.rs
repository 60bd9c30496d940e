//! Retry policy

use std::time::Duration;

/// One initial attempt plus three retries
pub const DEFAULT_MAX_ATTEMPTS: u32 = 4;

/// Backoff unit; the schedule is expressed in multiples of this
pub const DEFAULT_UNIT: Duration = Duration::from_secs(1);

/// Attempt budget and backoff schedule
///
/// `backoff(attempt) = (2^(attempt + 2) - 1) * unit`, giving 3, 7, 15, 31 units
/// for attempts 0 through 3.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    unit: Duration,
}

impl RetryPolicy {
    /// Create a policy; at least one attempt is always made
    pub fn new(max_attempts: u32, unit: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            unit,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn unit(&self) -> Duration {
        self.unit
    }

    /// Delay after the given failed attempt (zero-based)
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = attempt
            .checked_add(2)
            .and_then(|exp| 2u32.checked_pow(exp))
            .map_or(u32::MAX, |p| p - 1);
        self.unit.saturating_mul(factor)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, DEFAULT_UNIT)
    }
}

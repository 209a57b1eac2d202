//! Exponential backoff between retries.
//!
//! The wait before the k-th retry (1-indexed) is
//! `min(min_backoff * 2^(k-1), max_backoff)`: the first retry waits
//! `min_backoff`, each later one doubles until it hits the ceiling and stays
//! there. No jitter; the node rotation already spreads the load.

use std::time::Duration;

/// A pure attempt-index to wait-duration policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    min: Duration,
    max: Duration,
}

impl Backoff {
    /// `max` below `min` is raised to `min`.
    pub fn new(min: Duration, max: Duration) -> Self {
        Self { min, max: max.max(min) }
    }

    /// Wait before retry number `retry` (1-indexed). Retry 0 waits nothing.
    pub fn delay(&self, retry: u32) -> Duration {
        if retry == 0 {
            return Duration::ZERO;
        }
        1u32.checked_shl(retry - 1)
            .and_then(|factor| self.min.checked_mul(factor))
            .map_or(self.max, |delay| delay.min(self.max))
    }

    /// The waits before retries 1, 2, 3, ...
    pub fn delays(self) -> impl Iterator<Item = Duration> {
        (1..).map(move |retry| self.delay(retry))
    }
}

//! Retry policy for provider calls.
//!
//! The gateway owns retrying; benchmark code above it sees either a response
//! or the final error.

use std::time::Duration;

/// Delay schedule between attempts. `attempt` is 0-based: the delay after the
/// first failed attempt is `delay(0)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    /// Retry immediately.
    None,
    /// `attempt² × unit` (0, 1, 4, 9 … units).
    Quadratic { unit: Duration },
    /// `base × 2^attempt`, exponent capped at 5.
    Exponential { base: Duration },
}

impl Backoff {
    pub fn delay(&self, attempt: u32) -> Duration {
        match *self {
            Backoff::None => Duration::ZERO,
            Backoff::Quadratic { unit } => unit.saturating_mul(attempt.saturating_mul(attempt)),
            Backoff::Exponential { base } => {
                let multiplier = 2u32.pow(attempt.min(5));
                base.saturating_mul(multiplier)
            }
        }
    }
}

/// How many times to call the provider and how long to wait in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first one. Zero is treated as one.
    pub max_attempts: u32,
    pub backoff: Backoff,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Backoff::Quadratic {
                unit: Duration::from_secs(1),
            },
        }
    }
}

impl RetryPolicy {
    /// Single attempt, no retries.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            backoff: Backoff::None,
        }
    }

    pub fn new(max_attempts: u32, backoff: Backoff) -> Self {
        Self {
            max_attempts,
            backoff,
        }
    }

    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Whether another attempt may follow the (0-based) `attempt` that just failed.
    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt + 1 < self.attempts()
    }

    pub fn delay(&self, attempt: u32) -> Duration {
        self.backoff.delay(attempt)
    }
}

use std::fmt;
use std::time::Duration;

use crate::types::{FailureKind, FetchError};

/// Which retry schedule an error is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryTrack {
    /// Rate limit or overload: exponential delay.
    Backoff,
    /// Any other transient failure: linear delay.
    Plain,
    /// Never retried.
    Permanent,
}

impl fmt::Display for RetryTrack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RetryTrack::Backoff => write!(f, "backoff"),
            RetryTrack::Plain => write!(f, "plain"),
            RetryTrack::Permanent => write!(f, "permanent"),
        }
    }
}

const OVERLOAD_STATUSES: [u16; 3] = [429, 502, 503];
const OVERLOAD_PHRASES: [&str; 3] = ["rate limit", "too many requests", "service unavailable"];
const LEGAL_BLOCK: u16 = 451;

/// Dual-track retry schedule. Attempts are counted from 0 and shared by both
/// tracks; `max_*_attempts` include the first try.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub max_backoff_attempts: u32,
    pub plain_step: Duration,
    pub max_plain_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(10),
            max_backoff_attempts: 5,
            plain_step: Duration::from_millis(1000),
            max_plain_attempts: 3,
        }
    }
}

impl RetryPolicy {
    /// Disables every retry. Handy for tests and offline runs.
    pub fn none() -> Self {
        Self {
            max_backoff_attempts: 1,
            max_plain_attempts: 1,
            ..Self::default()
        }
    }

    pub fn classify(&self, error: &FetchError) -> RetryTrack {
        match error.kind {
            FailureKind::HttpStatus(LEGAL_BLOCK) => return RetryTrack::Permanent,
            FailureKind::HttpStatus(code) if OVERLOAD_STATUSES.contains(&code) => {
                return RetryTrack::Backoff
            }
            _ => {}
        }

        let message = error.message.to_lowercase();
        if OVERLOAD_PHRASES.iter().any(|phrase| message.contains(phrase)) {
            return RetryTrack::Backoff;
        }

        match error.kind {
            FailureKind::HttpStatus(code) if (400..500).contains(&code) => RetryTrack::Permanent,
            FailureKind::InvalidUrl | FailureKind::TooLarge { .. } => RetryTrack::Permanent,
            _ => RetryTrack::Plain,
        }
    }

    /// `min(initial_delay * 2^attempt, max_delay)`.
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let factor = 2u32.checked_pow(attempt).unwrap_or(u32::MAX);
        self.initial_delay
            .checked_mul(factor)
            .map_or(self.max_delay, |delay| delay.min(self.max_delay))
    }

    /// `plain_step * (attempt + 1)`.
    pub fn plain_delay(&self, attempt: u32) -> Duration {
        self.plain_step.saturating_mul(attempt.saturating_add(1))
    }

    /// Delay before the next attempt after `attempt` failed with `error`, or
    /// `None` when the item should be finalized as failed.
    pub fn next_delay(&self, error: &FetchError, attempt: u32) -> Option<(RetryTrack, Duration)> {
        let next = attempt.saturating_add(1);
        match self.classify(error) {
            RetryTrack::Backoff if next < self.max_backoff_attempts => {
                Some((RetryTrack::Backoff, self.backoff_delay(attempt)))
            }
            RetryTrack::Plain if next < self.max_plain_attempts => {
                Some((RetryTrack::Plain, self.plain_delay(attempt)))
            }
            _ => None,
        }
    }
}

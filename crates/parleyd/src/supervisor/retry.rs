//! Reconnect policy applied after every close.

use std::fmt;
use std::time::Duration;

use parley_config::Config;

use crate::protocol::CloseClass;

/// Why the supervisor stopped reconnecting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalReason {
    /// The device was unlinked; the credentials are void.
    LoggedOut,
    /// Consecutive recoverable closes exceeded the configured ceiling.
    RetriesExhausted {
        /// Reconnect attempts made before giving up.
        attempts: u32,
    },
}

impl fmt::Display for TerminalReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LoggedOut => f.write_str(
                "device logged out; delete the session directory and pair again",
            ),
            Self::RetriesExhausted { attempts } => write!(
                f,
                "gave up after {attempts} reconnect attempts; check connectivity and restart"
            ),
        }
    }
}

/// Outcome of [`RetryPolicy::decide`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Connect again after `delay`.
    Retry {
        /// Attempt number after incrementing.
        attempt: u32,
        /// Wait before connecting.
        delay: Duration,
    },
    /// Do not connect again.
    Stop(TerminalReason),
}

/// Capped linear backoff with a retry ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    base: Duration,
    cap: Duration,
}

impl RetryPolicy {
    /// Builds a policy allowing `max_attempts` consecutive retries.
    #[must_use]
    pub fn new(max_attempts: u32, base: Duration, cap: Duration) -> Self {
        Self {
            max_attempts,
            base,
            cap,
        }
    }

    /// Reads the policy from configuration.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.max_reconnect_attempts(),
            config.base_backoff(),
            config.max_backoff(),
        )
    }

    /// Retry ceiling.
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay before the `attempt`-th consecutive retry: `min(base * attempt, cap)`.
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base.saturating_mul(attempt).min(self.cap)
    }

    /// Decides what follows a close of class `class` after `attempts`
    /// consecutive retries.
    #[must_use]
    pub fn decide(&self, class: CloseClass, attempts: u32) -> RetryDecision {
        match class {
            CloseClass::LoggedOut => RetryDecision::Stop(TerminalReason::LoggedOut),
            CloseClass::Recoverable if attempts < self.max_attempts => {
                let attempt = attempts.saturating_add(1);
                RetryDecision::Retry {
                    attempt,
                    delay: self.delay_for(attempt),
                }
            }
            CloseClass::Recoverable => {
                RetryDecision::Stop(TerminalReason::RetriesExhausted { attempts })
            }
        }
    }
}

//! Connection lifecycle states reported by the supervisor.

use std::fmt;

/// Lifecycle of the protocol connection as seen by the supervisor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// Nothing attempted yet.
    #[default]
    Idle,
    /// A connection attempt is in progress.
    Connecting,
    /// The connection is ready for traffic.
    Open,
    /// The last connection ended; a retry may follow.
    Closed,
    /// The supervisor gave up and will not connect again.
    Terminal,
}

impl ConnectionState {
    /// Stable lower-case label for logs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Connecting => "connecting",
            Self::Open => "open",
            Self::Closed => "closed",
            Self::Terminal => "terminal",
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

use crate::logging::LogFormat;

/// Directory holding the credential files when none is configured.
pub const DEFAULT_SESSION_DIR: &str = "session";

/// Reconnect attempts allowed after consecutive recoverable closes.
pub const DEFAULT_MAX_RECONNECT_ATTEMPTS: u32 = 5;

/// First retry delay; later delays grow linearly from here.
pub const DEFAULT_BASE_BACKOFF_MS: u64 = 2_000;

/// Upper bound for any single retry delay.
pub const DEFAULT_MAX_BACKOFF_MS: u64 = 60_000;

/// Keep-alive period while the connection is open.
pub const DEFAULT_HEARTBEAT_INTERVAL_MS: u64 = 30_000;

/// Delay between the first successful open and the session export.
pub const DEFAULT_EXPORT_SETTLE_MS: u64 = 5_000;

/// Character that marks a message as a command invocation.
pub const DEFAULT_COMMAND_PREFIX: char = '.';

/// Default log filter expression used by the daemon.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Default log filter expression used by the daemon.
#[must_use]
pub fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Default logging format for the daemon.
#[must_use]
pub fn default_log_format() -> LogFormat {
    LogFormat::Json
}

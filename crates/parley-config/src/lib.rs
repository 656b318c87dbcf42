//! Shared configuration for the Parley daemon.
//!
//! Settings are layered by `ortho_config`: built-in defaults, then an optional
//! TOML file (`--config-path` or `PARLEY_CONFIG_PATH`), then `PARLEY_*`
//! environment variables, and finally command-line flags. Durations are
//! configured in milliseconds and exposed as [`Duration`] through accessors so
//! callers never handle raw integers.

mod defaults;
mod logging;
mod paths;

use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use defaults::{
    DEFAULT_BASE_BACKOFF_MS, DEFAULT_COMMAND_PREFIX, DEFAULT_EXPORT_SETTLE_MS,
    DEFAULT_HEARTBEAT_INTERVAL_MS, DEFAULT_LOG_FILTER, DEFAULT_MAX_BACKOFF_MS,
    DEFAULT_MAX_RECONNECT_ATTEMPTS, DEFAULT_SESSION_DIR, default_log_filter, default_log_format,
};
pub use logging::{LogFormat, LogFormatParseError};
pub use paths::{SessionPaths, SessionPathsError};

/// Resolved daemon configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq, OrthoConfig)]
#[ortho_config(prefix = "PARLEY")]
pub struct Config {
    /// Contact number used when requesting a pairing code.
    pub pairing_address: Option<String>,
    /// Portable session blob restored when no valid local session exists.
    pub session_blob: Option<String>,
    /// Directory holding the protocol layer's credential files.
    pub session_dir: Option<Utf8PathBuf>,
    /// File that receives the exported blob after a first-time pairing.
    pub session_export_path: Option<Utf8PathBuf>,
    /// Retry ceiling for consecutive recoverable closes.
    #[ortho_config(default = 5)]
    pub max_reconnect_attempts: u32,
    /// Backoff step in milliseconds.
    #[ortho_config(default = 2000)]
    pub base_backoff_ms: u64,
    /// Backoff cap in milliseconds.
    #[ortho_config(default = 60000)]
    pub max_backoff_ms: u64,
    /// Keep-alive period in milliseconds.
    #[ortho_config(default = 30000)]
    pub heartbeat_interval_ms: u64,
    /// Settle delay in milliseconds before exporting a freshly paired session.
    #[ortho_config(default = 5000)]
    pub export_settle_ms: u64,
    /// Single character that marks a command invocation.
    #[ortho_config(default = '.')]
    pub command_prefix: char,
    /// `tracing` filter expression.
    pub log_filter: Option<String>,
    /// Output format for log lines.
    pub log_format: Option<LogFormat>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pairing_address: None,
            session_blob: None,
            session_dir: None,
            session_export_path: None,
            max_reconnect_attempts: DEFAULT_MAX_RECONNECT_ATTEMPTS,
            base_backoff_ms: DEFAULT_BASE_BACKOFF_MS,
            max_backoff_ms: DEFAULT_MAX_BACKOFF_MS,
            heartbeat_interval_ms: DEFAULT_HEARTBEAT_INTERVAL_MS,
            export_settle_ms: DEFAULT_EXPORT_SETTLE_MS,
            command_prefix: DEFAULT_COMMAND_PREFIX,
            log_filter: None,
            log_format: None,
        }
    }
}

impl Config {
    /// Contact number used for pairing, ignoring blank values.
    #[must_use]
    pub fn pairing_address(&self) -> Option<&str> {
        non_blank(self.pairing_address.as_deref())
    }

    /// Session blob supplied by the operator, ignoring blank values.
    #[must_use]
    pub fn session_blob(&self) -> Option<&str> {
        non_blank(self.session_blob.as_deref())
    }

    /// Credential directory, falling back to [`DEFAULT_SESSION_DIR`].
    #[must_use]
    pub fn session_dir(&self) -> &Utf8Path {
        self.session_dir
            .as_deref()
            .unwrap_or_else(|| Utf8Path::new(DEFAULT_SESSION_DIR))
    }

    /// Destination for the first-pairing export, when configured.
    #[must_use]
    pub fn session_export_path(&self) -> Option<&Utf8Path> {
        self.session_export_path.as_deref()
    }

    /// Retry ceiling for consecutive recoverable closes.
    #[must_use]
    pub fn max_reconnect_attempts(&self) -> u32 {
        self.max_reconnect_attempts
    }

    /// Backoff step.
    #[must_use]
    pub fn base_backoff(&self) -> Duration {
        Duration::from_millis(self.base_backoff_ms)
    }

    /// Backoff cap.
    #[must_use]
    pub fn max_backoff(&self) -> Duration {
        Duration::from_millis(self.max_backoff_ms)
    }

    /// Keep-alive period.
    #[must_use]
    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_millis(self.heartbeat_interval_ms)
    }

    /// Settle delay before a first-time session export.
    #[must_use]
    pub fn export_settle(&self) -> Duration {
        Duration::from_millis(self.export_settle_ms)
    }

    /// Command invocation prefix.
    #[must_use]
    pub fn command_prefix(&self) -> char {
        self.command_prefix
    }

    /// Log filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        self.log_filter.as_deref().unwrap_or(DEFAULT_LOG_FILTER)
    }

    /// Log output format.
    #[must_use]
    pub fn log_format(&self) -> LogFormat {
        self.log_format.unwrap_or_else(default_log_format)
    }

    /// Checks invariants that the layered loader cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] describing the first violated invariant.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.heartbeat_interval_ms == 0 {
            return Err(ConfigError::ZeroHeartbeat);
        }
        if self.base_backoff_ms == 0 {
            return Err(ConfigError::ZeroBackoff);
        }
        if self.max_backoff_ms < self.base_backoff_ms {
            return Err(ConfigError::BackoffCapBelowBase {
                base_ms: self.base_backoff_ms,
                max_ms: self.max_backoff_ms,
            });
        }
        if self.command_prefix.is_whitespace() {
            return Err(ConfigError::WhitespacePrefix);
        }
        Ok(())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

/// Invariant violations detected by [`Config::validate`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The heartbeat interval was zero.
    #[error("heartbeat_interval_ms must be greater than zero")]
    ZeroHeartbeat,
    /// The backoff step was zero.
    #[error("base_backoff_ms must be greater than zero")]
    ZeroBackoff,
    /// The backoff cap was lower than the step.
    #[error("max_backoff_ms ({max_ms}) must not be lower than base_backoff_ms ({base_ms})")]
    BackoffCapBelowBase {
        /// Configured step.
        base_ms: u64,
        /// Configured cap.
        max_ms: u64,
    },
    /// The command prefix was a whitespace character.
    #[error("command_prefix must not be whitespace")]
    WhitespacePrefix,
}

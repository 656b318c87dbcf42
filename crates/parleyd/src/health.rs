//! Structured health reporting for daemon lifecycle events.

use std::sync::Arc;
use std::time::Duration;

use parley_config::Config;
use parley_session::SessionOrigin;

use crate::bootstrap::BootstrapError;
use crate::protocol::PairingError;
use crate::supervisor::{ConnectionState, ExportError, ExportedSession, SupervisorExit};

const HEALTH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::health");

/// Observer trait used to surface lifecycle events to operators.
pub trait HealthReporter: Send + Sync {
    /// Invoked before configuration loading begins.
    fn bootstrap_starting(&self);

    /// Invoked after bootstrap completes successfully.
    fn bootstrap_succeeded(&self, config: &Config);

    /// Invoked when bootstrap fails.
    fn bootstrap_failed(&self, error: &BootstrapError);

    /// Invoked once the credential directory is ready.
    fn session_prepared(&self, origin: SessionOrigin);

    /// Invoked on every connection state transition.
    fn connection_state_changed(&self, state: ConnectionState);

    /// Invoked when a pairing code is available for the operator.
    fn pairing_code_issued(&self, code: &str);

    /// Invoked when a pairing code could not be obtained.
    fn pairing_failed(&self, error: &PairingError);

    /// Invoked when a reconnect has been scheduled.
    fn reconnect_scheduled(&self, attempt: u32, delay: Duration);

    /// Invoked after a freshly paired session has been exported.
    fn session_exported(&self, export: &ExportedSession);

    /// Invoked when exporting a freshly paired session failed.
    fn session_export_failed(&self, error: &ExportError);

    /// Invoked when the supervisor returns.
    fn supervisor_stopped(&self, exit: &SupervisorExit);
}

impl<T> HealthReporter for Arc<T>
where
    T: HealthReporter + ?Sized,
{
    fn bootstrap_starting(&self) {
        (**self).bootstrap_starting();
    }

    fn bootstrap_succeeded(&self, config: &Config) {
        (**self).bootstrap_succeeded(config);
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        (**self).bootstrap_failed(error);
    }

    fn session_prepared(&self, origin: SessionOrigin) {
        (**self).session_prepared(origin);
    }

    fn connection_state_changed(&self, state: ConnectionState) {
        (**self).connection_state_changed(state);
    }

    fn pairing_code_issued(&self, code: &str) {
        (**self).pairing_code_issued(code);
    }

    fn pairing_failed(&self, error: &PairingError) {
        (**self).pairing_failed(error);
    }

    fn reconnect_scheduled(&self, attempt: u32, delay: Duration) {
        (**self).reconnect_scheduled(attempt, delay);
    }

    fn session_exported(&self, export: &ExportedSession) {
        (**self).session_exported(export);
    }

    fn session_export_failed(&self, error: &ExportError) {
        (**self).session_export_failed(error);
    }

    fn supervisor_stopped(&self, exit: &SupervisorExit) {
        (**self).supervisor_stopped(exit);
    }
}

/// Default reporter that records lifecycle events using `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredHealthReporter;

impl StructuredHealthReporter {
    /// Builds a new reporter.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl HealthReporter for StructuredHealthReporter {
    fn bootstrap_starting(&self) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "bootstrap_starting",
            "starting daemon bootstrap"
        );
    }

    fn bootstrap_succeeded(&self, config: &Config) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "bootstrap_succeeded",
            session_dir = %config.session_dir(),
            command_prefix = %config.command_prefix(),
            log_filter = %config.log_filter(),
            log_format = %config.log_format(),
            "daemon bootstrap completed"
        );
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        tracing::error!(
            target: HEALTH_TARGET,
            event = "bootstrap_failed",
            error = %error,
            "daemon bootstrap failed"
        );
    }

    fn session_prepared(&self, origin: SessionOrigin) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "session_prepared",
            origin = ?origin,
            "session directory ready"
        );
    }

    fn connection_state_changed(&self, state: ConnectionState) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "connection_state",
            state = %state,
            "connection state changed"
        );
    }

    fn pairing_code_issued(&self, code: &str) {
        tracing::warn!(
            target: HEALTH_TARGET,
            event = "pairing_code",
            code = %code,
            "enter this pairing code under Linked Devices > Link with phone number"
        );
    }

    fn pairing_failed(&self, error: &PairingError) {
        tracing::error!(
            target: HEALTH_TARGET,
            event = "pairing_failed",
            error = %error,
            "could not obtain a pairing code"
        );
    }

    fn reconnect_scheduled(&self, attempt: u32, delay: Duration) {
        tracing::warn!(
            target: HEALTH_TARGET,
            event = "reconnect_scheduled",
            attempt,
            delay_ms = delay.as_millis(),
            "connection closed; reconnecting"
        );
    }

    fn session_exported(&self, export: &ExportedSession) {
        tracing::warn!(
            target: HEALTH_TARGET,
            event = "session_exported",
            blob = %export.blob,
            path = ?export.path,
            "session exported; store this blob as PARLEY_SESSION_BLOB to skip pairing elsewhere"
        );
    }

    fn session_export_failed(&self, error: &ExportError) {
        tracing::error!(
            target: HEALTH_TARGET,
            event = "session_export_failed",
            error = %error,
            "session export failed"
        );
    }

    fn supervisor_stopped(&self, exit: &SupervisorExit) {
        match exit {
            SupervisorExit::Shutdown => tracing::info!(
                target: HEALTH_TARGET,
                event = "supervisor_stopped",
                "connection supervisor stopped on request"
            ),
            SupervisorExit::Terminal(reason) => tracing::error!(
                target: HEALTH_TARGET,
                event = "supervisor_stopped",
                reason = %reason,
                "connection supervisor halted"
            ),
        }
    }
}

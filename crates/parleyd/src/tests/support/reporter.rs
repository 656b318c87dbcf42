//! Test double for [`HealthReporter`] that records structured events for assertions.

use std::sync::Mutex;
use std::time::Duration;

use parley_config::Config;
use parley_session::SessionOrigin;

use crate::bootstrap::BootstrapError;
use crate::health::HealthReporter;
use crate::protocol::PairingError;
use crate::supervisor::{ConnectionState, ExportError, ExportedSession, SupervisorExit};

/// Structured health events tracked during scenarios.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthEvent {
    BootstrapStarting,
    BootstrapSucceeded,
    BootstrapFailed(String),
    SessionPrepared(SessionOrigin),
    State(ConnectionState),
    PairingCode(String),
    PairingFailed(String),
    ReconnectScheduled { attempt: u32, delay: Duration },
    SessionExported(ExportedSession),
    SessionExportFailed(String),
    SupervisorStopped(SupervisorExit),
}

/// Records health events for assertions.
#[derive(Debug, Default)]
pub struct RecordingHealthReporter {
    events: Mutex<Vec<HealthEvent>>,
}

impl RecordingHealthReporter {
    /// Captures a copy of the recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<HealthEvent> {
        self.events
            .lock()
            .expect("health reporter mutex poisoned")
            .clone()
    }

    /// Connection states in the order they were entered.
    #[must_use]
    pub fn states(&self) -> Vec<ConnectionState> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                HealthEvent::State(state) => Some(state),
                _ => None,
            })
            .collect()
    }

    /// Reconnect attempts and delays in scheduling order.
    #[must_use]
    pub fn reconnects(&self) -> Vec<(u32, Duration)> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                HealthEvent::ReconnectScheduled { attempt, delay } => Some((attempt, delay)),
                _ => None,
            })
            .collect()
    }

    /// Successful exports.
    #[must_use]
    pub fn exports(&self) -> Vec<ExportedSession> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                HealthEvent::SessionExported(export) => Some(export),
                _ => None,
            })
            .collect()
    }

    fn record(&self, event: HealthEvent) {
        self.events
            .lock()
            .expect("health reporter mutex poisoned")
            .push(event);
    }
}

impl HealthReporter for RecordingHealthReporter {
    fn bootstrap_starting(&self) {
        self.record(HealthEvent::BootstrapStarting);
    }

    fn bootstrap_succeeded(&self, _config: &Config) {
        self.record(HealthEvent::BootstrapSucceeded);
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        self.record(HealthEvent::BootstrapFailed(error.to_string()));
    }

    fn session_prepared(&self, origin: SessionOrigin) {
        self.record(HealthEvent::SessionPrepared(origin));
    }

    fn connection_state_changed(&self, state: ConnectionState) {
        self.record(HealthEvent::State(state));
    }

    fn pairing_code_issued(&self, code: &str) {
        self.record(HealthEvent::PairingCode(code.to_owned()));
    }

    fn pairing_failed(&self, error: &PairingError) {
        self.record(HealthEvent::PairingFailed(error.to_string()));
    }

    fn reconnect_scheduled(&self, attempt: u32, delay: Duration) {
        self.record(HealthEvent::ReconnectScheduled { attempt, delay });
    }

    fn session_exported(&self, export: &ExportedSession) {
        self.record(HealthEvent::SessionExported(export.clone()));
    }

    fn session_export_failed(&self, error: &ExportError) {
        self.record(HealthEvent::SessionExportFailed(error.to_string()));
    }

    fn supervisor_stopped(&self, exit: &SupervisorExit) {
        self.record(HealthEvent::SupervisorStopped(*exit));
    }
}

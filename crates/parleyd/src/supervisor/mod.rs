//! Connection supervisor.
//!
//! The supervisor owns the connection lifecycle. It opens one connection
//! attempt at a time, drains that attempt's event channel on the calling
//! thread, runs a heartbeat while the connection is open, and applies the
//! retry policy whenever the connection closes. Inbound messages are handed
//! to the command dispatcher inline, so commands never race each other.

mod export;
mod heartbeat;
mod pairing;
mod retry;
mod state;

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::RecvTimeoutError;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use parley_commands::{DispatchOutcome, Dispatcher};
use parley_config::Config;
use parley_session::{SessionOrigin, SessionStore};

use crate::health::HealthReporter;
use crate::process::ShutdownToken;
use crate::protocol::{Connection, ConnectOptions, Connector, DisconnectReason, Link, ProtocolEvent};

pub use export::{ExportError, ExportedSession};
pub use heartbeat::Heartbeat;
pub use pairing::format_pairing_code;
pub use retry::{RetryDecision, RetryPolicy, TerminalReason};
pub use state::ConnectionState;

use export::SessionExporter;
use pairing::PairingGate;

pub(crate) const SUPERVISOR_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::supervisor");

/// Longest time the event loop blocks before re-checking for shutdown.
const EVENT_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// How [`Supervisor::run`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorExit {
    /// Shutdown was requested.
    Shutdown,
    /// The retry policy refused to reconnect.
    Terminal(TerminalReason),
}

impl fmt::Display for SupervisorExit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Shutdown => f.write_str("shutdown"),
            Self::Terminal(reason) => write!(f, "terminal: {reason}"),
        }
    }
}

/// Tunables for a [`Supervisor`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupervisorSettings {
    /// Reconnect policy.
    pub retry: RetryPolicy,
    /// Period between presence updates while open.
    pub heartbeat_interval: Duration,
    /// Delay between the first open and the session export.
    pub export_settle: Duration,
    /// Whether the session must be exported after the first open.
    pub export_on_open: bool,
    /// File receiving the exported blob.
    pub export_path: Option<PathBuf>,
    /// Contact number used to request pairing codes.
    pub pairing_address: Option<String>,
}

impl SupervisorSettings {
    /// Derives settings from configuration and the prepared session origin.
    ///
    /// An export is owed only for a fresh pairing that was not seeded from a
    /// blob.
    #[must_use]
    pub fn from_config(config: &Config, origin: SessionOrigin) -> Self {
        Self {
            retry: RetryPolicy::from_config(config),
            heartbeat_interval: config.heartbeat_interval(),
            export_settle: config.export_settle(),
            export_on_open: origin.is_fresh() && config.session_blob().is_none(),
            export_path: config
                .session_export_path()
                .map(|path| path.as_std_path().to_path_buf()),
            pairing_address: config.pairing_address().map(str::to_owned),
        }
    }
}

enum AttemptEnd {
    Closed(DisconnectReason),
    Shutdown,
}

/// Drives connection attempts until shutdown or a terminal close.
pub struct Supervisor {
    settings: SupervisorSettings,
    store: SessionStore,
    dispatcher: Dispatcher,
    reporter: Arc<dyn HealthReporter>,
    state: ConnectionState,
    attempts: u32,
    exporter: SessionExporter,
}

impl Supervisor {
    /// Builds a supervisor in the [`ConnectionState::Idle`] state.
    #[must_use]
    pub fn new(
        settings: SupervisorSettings,
        store: SessionStore,
        dispatcher: Dispatcher,
        reporter: Arc<dyn HealthReporter>,
    ) -> Self {
        let exporter = SessionExporter::new(
            settings.export_on_open,
            settings.export_settle,
            settings.export_path.clone(),
        );
        Self {
            settings,
            store,
            dispatcher,
            reporter,
            state: ConnectionState::Idle,
            attempts: 0,
            exporter,
        }
    }

    /// Current connection state.
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Consecutive reconnect attempts since the last open.
    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Runs until shutdown is requested or the retry policy gives up.
    pub fn run(&mut self, connector: &dyn Connector, shutdown: &ShutdownToken) -> SupervisorExit {
        let exit = self.run_loop(connector, shutdown);
        self.reporter.supervisor_stopped(&exit);
        exit
    }

    fn run_loop(&mut self, connector: &dyn Connector, shutdown: &ShutdownToken) -> SupervisorExit {
        loop {
            if shutdown.is_triggered() {
                return SupervisorExit::Shutdown;
            }
            self.transition(ConnectionState::Connecting);
            let reason = match self.run_attempt(connector, shutdown) {
                AttemptEnd::Shutdown => return SupervisorExit::Shutdown,
                AttemptEnd::Closed(reason) => reason,
            };
            self.exporter.on_close();
            self.transition(ConnectionState::Closed);

            match self.settings.retry.decide(reason.classify(), self.attempts) {
                RetryDecision::Retry { attempt, delay } => {
                    self.attempts = attempt;
                    debug!(
                        target: SUPERVISOR_TARGET,
                        reason = %reason,
                        attempt,
                        "scheduling reconnect"
                    );
                    self.reporter.reconnect_scheduled(attempt, delay);
                    if shutdown.wait_timeout(delay) {
                        return SupervisorExit::Shutdown;
                    }
                }
                RetryDecision::Stop(terminal) => {
                    warn!(
                        target: SUPERVISOR_TARGET,
                        reason = %reason,
                        "not reconnecting"
                    );
                    self.transition(ConnectionState::Terminal);
                    return SupervisorExit::Terminal(terminal);
                }
            }
        }
    }

    fn run_attempt(&mut self, connector: &dyn Connector, shutdown: &ShutdownToken) -> AttemptEnd {
        let options = ConnectOptions {
            session_dir: self.store.dir().to_path_buf(),
            attempt: self.attempts.saturating_add(1),
        };
        let Connection { link, events } = match connector.connect(&options) {
            Ok(connection) => connection,
            Err(error) => {
                warn!(
                    target: SUPERVISOR_TARGET,
                    error = %error,
                    "connect failed"
                );
                return AttemptEnd::Closed(DisconnectReason::ConnectFailed {
                    message: error.to_string(),
                });
            }
        };

        let mut pairing = PairingGate::default();
        self.request_pairing(&mut pairing, link.as_ref());
        let mut heartbeat: Option<Heartbeat> = None;

        let end = loop {
            if shutdown.is_triggered() {
                link.close();
                break AttemptEnd::Shutdown;
            }
            let now = Instant::now();
            if let Some(result) = self.exporter.poll(now, &self.store) {
                match result {
                    Ok(export) => self.reporter.session_exported(&export),
                    Err(error) => self.reporter.session_export_failed(&error),
                }
            }
            let wait = self
                .exporter
                .time_until_due(now)
                .map_or(EVENT_POLL_INTERVAL, |due| due.min(EVENT_POLL_INTERVAL));

            match events.recv_timeout(wait) {
                Ok(ProtocolEvent::Connecting) => {
                    self.request_pairing(&mut pairing, link.as_ref());
                }
                Ok(ProtocolEvent::Open) => {
                    self.attempts = 0;
                    self.transition(ConnectionState::Open);
                    if let Some(previous) = heartbeat.take() {
                        previous.stop();
                    }
                    heartbeat = self.start_heartbeat(&link);
                    self.exporter.on_open(Instant::now());
                }
                Ok(ProtocolEvent::Close(reason)) => break AttemptEnd::Closed(reason),
                Ok(ProtocolEvent::CredentialsUpdated(update)) => {
                    if let Err(error) = self.store.apply_update(&update) {
                        warn!(
                            target: SUPERVISOR_TARGET,
                            error = %error,
                            "failed to persist credential update"
                        );
                    }
                }
                Ok(ProtocolEvent::MessageReceived(message)) => {
                    let outcome = self.dispatcher.dispatch(&message, link.as_ref());
                    if outcome != DispatchOutcome::Ignored {
                        debug!(
                            target: SUPERVISOR_TARGET,
                            outcome = ?outcome,
                            "message dispatched"
                        );
                    }
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    break AttemptEnd::Closed(DisconnectReason::StreamEnded);
                }
            }
        };

        if let Some(heartbeat) = heartbeat {
            heartbeat.stop();
        }
        end
    }

    fn request_pairing(&self, gate: &mut PairingGate, link: &dyn Link) {
        match gate.request(link, self.settings.pairing_address.as_deref()) {
            Some(Ok(code)) => self.reporter.pairing_code_issued(&code),
            Some(Err(error)) => self.reporter.pairing_failed(&error),
            None => {}
        }
    }

    fn start_heartbeat(&self, link: &Arc<dyn Link>) -> Option<Heartbeat> {
        match Heartbeat::start(Arc::clone(link), self.settings.heartbeat_interval) {
            Ok(heartbeat) => Some(heartbeat),
            Err(error) => {
                warn!(
                    target: SUPERVISOR_TARGET,
                    error = %error,
                    "failed to start heartbeat"
                );
                None
            }
        }
    }

    fn transition(&mut self, next: ConnectionState) {
        if self.state != next {
            debug!(
                target: SUPERVISOR_TARGET,
                from = %self.state,
                to = %next,
                "state transition"
            );
            self.state = next;
            self.reporter.connection_state_changed(next);
        }
    }
}

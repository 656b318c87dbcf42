//! Harness running a [`Supervisor`] against a [`ScriptedConnector`].

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tempfile::TempDir;

use parley_commands::{Dispatcher, builtin};
use parley_session::SessionStore;

use crate::process::ShutdownToken;
use crate::supervisor::{RetryPolicy, Supervisor, SupervisorExit, SupervisorSettings};

use super::connector::{Script, ScriptedConnector};
use super::reporter::RecordingHealthReporter;

/// Upper bound on any single supervisor run before the harness forces a
/// shutdown.
const WATCHDOG: Duration = Duration::from_secs(10);

/// Scripted supervisor scenario.
pub struct SupervisorWorld {
    temp: TempDir,
    pub settings: SupervisorSettings,
    pub connector: ScriptedConnector,
    pub reporter: Arc<RecordingHealthReporter>,
    pub shutdown: ShutdownToken,
    exit: Option<SupervisorExit>,
}

impl SupervisorWorld {
    /// Builds a world with fast timings and `max_attempts` retries.
    #[must_use]
    pub fn new(max_attempts: u32) -> Self {
        let temp = TempDir::new().expect("temp dir");
        std::fs::create_dir(temp.path().join("session")).expect("create session dir");
        Self {
            temp,
            settings: SupervisorSettings {
                retry: RetryPolicy::new(
                    max_attempts,
                    Duration::from_millis(1),
                    Duration::from_millis(5),
                ),
                heartbeat_interval: Duration::from_millis(10),
                export_settle: Duration::ZERO,
                export_on_open: false,
                export_path: None,
                pairing_address: None,
            },
            connector: ScriptedConnector::new(Vec::<Script>::new()),
            reporter: Arc::new(RecordingHealthReporter::default()),
            shutdown: ShutdownToken::new(),
            exit: None,
        }
    }

    /// Store rooted in this world's session directory.
    #[must_use]
    pub fn store(&self) -> SessionStore {
        SessionStore::new(self.temp.path().join("session"))
    }

    /// Path under the world's temporary directory.
    #[must_use]
    pub fn path(&self, name: &str) -> std::path::PathBuf {
        self.temp.path().join(name)
    }

    /// Queues `count` copies of `script`.
    pub fn queue(&self, script: &Script, count: usize) {
        for _ in 0..count {
            self.connector.push(script.clone());
        }
    }

    /// Triggers shutdown after `delay` from a helper thread.
    pub fn shutdown_after(&self, delay: Duration) {
        let token = self.shutdown.clone();
        thread::spawn(move || {
            thread::sleep(delay);
            token.trigger();
        });
    }

    /// Runs the supervisor to completion on the calling thread.
    pub fn run(&mut self) -> SupervisorExit {
        let registry = builtin::registry().expect("built-in commands register");
        let dispatcher = Dispatcher::new(Arc::new(registry), '.');
        let mut supervisor = Supervisor::new(
            self.settings.clone(),
            self.store(),
            dispatcher,
            self.reporter.clone(),
        );
        self.shutdown_after(WATCHDOG);
        let exit = supervisor.run(&self.connector, &self.shutdown);
        self.exit = Some(exit);
        exit
    }

    #[must_use]
    pub fn exit(&self) -> Option<SupervisorExit> {
        self.exit
    }
}

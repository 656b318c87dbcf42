//! BDD world for the bootstrap suite: loader, reporter, and bootstrap outcome.

use std::cell::RefCell;
use std::fs;
use std::sync::Arc;

use parley_session::{PRIMARY_RECORD, SessionOrigin};

use crate::bootstrap::{BootstrapError, ConfigLoader, Daemon, bootstrap_with};

use super::config_loader::{FailingConfigLoader, TestConfigLoader};
use super::reporter::RecordingHealthReporter;

/// Scenario world shared across BDD steps.
pub struct TestWorld {
    pub loader: TestConfigLoader,
    failing: bool,
    pub reporter: Arc<RecordingHealthReporter>,
    daemon: Option<Daemon>,
    bootstrap_error: Option<BootstrapError>,
}

impl TestWorld {
    #[must_use]
    pub fn new() -> Self {
        Self {
            loader: TestConfigLoader::new(),
            failing: false,
            reporter: Arc::new(RecordingHealthReporter::default()),
            daemon: None,
            bootstrap_error: None,
        }
    }

    /// Installs a loader that always fails.
    pub fn use_failing_loader(&mut self) {
        self.failing = true;
    }

    /// Writes a primary credential record into the session directory.
    pub fn seed_local_session(&self, contents: &str) {
        let dir = self.loader.session_dir();
        fs::create_dir_all(&dir).expect("create session dir");
        fs::write(dir.join(PRIMARY_RECORD), contents).expect("seed local session");
    }

    /// Runs the bootstrap sequence once.
    pub fn bootstrap(&mut self) {
        if self.daemon.is_some() || self.bootstrap_error.is_some() {
            return;
        }
        let loader: &dyn ConfigLoader = if self.failing {
            &FailingConfigLoader
        } else {
            &self.loader
        };
        match bootstrap_with(loader, self.reporter.clone()) {
            Ok(daemon) => self.daemon = Some(daemon),
            Err(error) => self.bootstrap_error = Some(error),
        }
    }

    #[must_use]
    pub fn bootstrap_error(&self) -> Option<&BootstrapError> {
        self.bootstrap_error.as_ref()
    }

    #[must_use]
    pub fn daemon(&self) -> Option<&Daemon> {
        self.daemon.as_ref()
    }

    /// Origin of the prepared session, when bootstrap succeeded.
    #[must_use]
    pub fn origin(&self) -> Option<SessionOrigin> {
        self.daemon.as_ref().map(Daemon::origin)
    }

    /// Current contents of the primary credential record.
    #[must_use]
    pub fn primary_record(&self) -> Option<String> {
        fs::read_to_string(self.loader.session_dir().join(PRIMARY_RECORD)).ok()
    }
}

impl Default for TestWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Default test world fixture.
#[must_use]
pub fn world() -> RefCell<TestWorld> {
    RefCell::new(TestWorld::new())
}

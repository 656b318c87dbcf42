//! Shared doubles for the daemon's behavioural and unit suites.

mod config_loader;
mod connector;
mod reporter;
mod supervisor_world;
mod world;

pub use config_loader::{FailingConfigLoader, TestConfigLoader};
pub use connector::{Script, ScriptedConnector, Step};
pub use reporter::{HealthEvent, RecordingHealthReporter};
pub use supervisor_world::SupervisorWorld;
pub use world::{TestWorld, world};

use std::sync::Mutex;

use parley_session::{CredentialBundle, PRIMARY_RECORD};

/// Shared `Vec<u8>` sink usable as a console output stream.
#[derive(Debug, Clone, Default)]
pub struct SharedSink(std::sync::Arc<Mutex<Vec<u8>>>);

impl SharedSink {
    /// Everything written so far, decoded as UTF-8.
    #[must_use]
    pub fn contents(&self) -> String {
        String::from_utf8(self.0.lock().expect("sink mutex poisoned").clone())
            .expect("console output should be UTF-8")
    }
}

impl std::io::Write for SharedSink {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().expect("sink mutex poisoned").write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Builds a credential bundle holding only the primary record.
#[must_use]
pub fn credentials(contents: &str) -> CredentialBundle {
    let mut bundle = CredentialBundle::new();
    bundle
        .insert(PRIMARY_RECORD, contents.as_bytes().to_vec())
        .expect("primary record name is valid");
    bundle
}

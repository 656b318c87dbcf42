//! One-off export of a freshly paired session.
//!
//! After the first successful open of a session that had to be paired, the
//! credential directory is encoded as a blob so the operator can seed other
//! deployments with it. The export waits for a settle delay so the protocol
//! can finish writing its credential files, and happens at most once per
//! process.

use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use thiserror::Error;

use parley_session::{SessionError, SessionStore, atomic_write};

/// A completed export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedSession {
    /// Encoded session blob.
    pub blob: String,
    /// File the blob was written to, when configured.
    pub path: Option<PathBuf>,
}

/// Errors raised while exporting a session.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The credential directory could not be encoded.
    #[error("failed to export session: {0}")]
    Session(#[from] SessionError),
    /// The export file could not be written.
    #[error("failed to write session export to '{}': {source}", path.display())]
    Write {
        /// Destination file.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
}

/// Schedules and performs the export.
#[derive(Debug)]
pub(crate) struct SessionExporter {
    enabled: bool,
    settle: Duration,
    path: Option<PathBuf>,
    deadline: Option<Instant>,
    completed: bool,
}

impl SessionExporter {
    pub(crate) fn new(enabled: bool, settle: Duration, path: Option<PathBuf>) -> Self {
        Self {
            enabled,
            settle,
            path,
            deadline: None,
            completed: false,
        }
    }

    /// Arms the settle timer when an export is still owed.
    pub(crate) fn on_open(&mut self, now: Instant) {
        if self.enabled && !self.completed {
            self.deadline = Some(now + self.settle);
        }
    }

    /// Disarms the timer; the next open re-arms it.
    pub(crate) fn on_close(&mut self) {
        self.deadline = None;
    }

    /// Time left until the export is due.
    pub(crate) fn time_until_due(&self, now: Instant) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(now))
    }

    /// Performs the export once the settle delay has passed.
    ///
    /// Returns `None` when nothing is due. A failed export stays owed and is
    /// retried after the next open.
    pub(crate) fn poll(
        &mut self,
        now: Instant,
        store: &SessionStore,
    ) -> Option<Result<ExportedSession, ExportError>> {
        let deadline = self.deadline?;
        if now < deadline {
            return None;
        }
        self.deadline = None;
        let result = export(store, self.path.as_deref());
        self.completed = result.is_ok();
        Some(result)
    }
}

fn export(store: &SessionStore, path: Option<&Path>) -> Result<ExportedSession, ExportError> {
    let blob = store.export_blob()?;
    if let Some(path) = path {
        let mut contents = blob.clone().into_bytes();
        contents.push(b'\n');
        atomic_write(path, &contents).map_err(|source| ExportError::Write {
            path: path.to_path_buf(),
            source,
        })?;
    }
    Ok(ExportedSession {
        blob,
        path: path.map(Path::to_path_buf),
    })
}

//! The credential directory and the operations that move it in and out of
//! portable form.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::STORE_TARGET;
use crate::atomic::{atomic_write, replace_directory};
use crate::bundle::{CredentialBundle, validate_file_name};
use crate::codec::{decode_bundle, encode_bundle};
use crate::error::SessionError;

/// File whose presence marks the directory as holding a usable session.
pub const PRIMARY_RECORD: &str = "creds.json";

/// Result of [`SessionStore::restore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreOutcome {
    /// No blob was supplied; the directory was left untouched.
    NotProvided,
    /// The directory now holds exactly the decoded bundle.
    Restored(CredentialBundle),
}

/// Where the credentials used for the next connect came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOrigin {
    /// A valid session was already on disk.
    Local,
    /// The directory was seeded from a portable blob.
    Restored,
    /// No usable credentials; the next connect must pair.
    Fresh,
}

impl SessionOrigin {
    /// Reports whether the next connect has to pair from scratch.
    #[must_use]
    pub fn is_fresh(self) -> bool {
        matches!(self, Self::Fresh)
    }
}

/// Owns the on-disk credential directory.
#[derive(Debug, Clone)]
pub struct SessionStore {
    dir: PathBuf,
}

impl SessionStore {
    /// Creates a store rooted at `dir`. Nothing is touched on disk.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the credential files.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Reports whether the primary record exists and is non-empty.
    #[must_use]
    pub fn has_valid_local_session(&self) -> bool {
        fs::metadata(self.dir.join(PRIMARY_RECORD))
            .is_ok_and(|metadata| metadata.is_file() && metadata.len() > 0)
    }

    /// Replaces the directory contents with the bundle decoded from `blob`.
    ///
    /// With no blob this is a no-op. A blob that fails to decode leaves the
    /// directory exactly as it was.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Decode`] for a malformed blob and
    /// [`SessionError::Io`] when the directory cannot be replaced.
    pub fn restore(&self, blob: Option<&str>) -> Result<RestoreOutcome, SessionError> {
        let Some(blob) = blob else {
            return Ok(RestoreOutcome::NotProvided);
        };
        let bundle = decode_bundle(blob)?;
        replace_directory(&self.dir, &bundle)?;
        info!(
            target: STORE_TARGET,
            files = bundle.len(),
            dir = %self.dir.display(),
            "restored session from blob"
        );
        Ok(RestoreOutcome::Restored(bundle))
    }

    /// Reads every regular credential file into a bundle.
    ///
    /// Sub-directories, dot-files and names that are not valid UTF-8 are
    /// skipped.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Io`] when the directory or a file cannot be
    /// read.
    pub fn export(&self) -> Result<CredentialBundle, SessionError> {
        let entries = fs::read_dir(&self.dir)
            .map_err(|source| SessionError::io("read directory", &self.dir, source))?;
        let mut bundle = CredentialBundle::new();
        for entry in entries {
            let entry =
                entry.map_err(|source| SessionError::io("read directory", &self.dir, source))?;
            let path = entry.path();
            let file_type = entry
                .file_type()
                .map_err(|source| SessionError::io("inspect", &path, source))?;
            if !file_type.is_file() {
                continue;
            }
            let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
                warn!(
                    target: STORE_TARGET,
                    path = %path.display(),
                    "skipping credential file with a non UTF-8 name"
                );
                continue;
            };
            if validate_file_name(&name).is_err() {
                continue;
            }
            let contents =
                fs::read(&path).map_err(|source| SessionError::io("read", &path, source))?;
            bundle.insert(name, contents)?;
        }
        Ok(bundle)
    }

    /// Exports the directory and encodes it as a blob.
    ///
    /// # Errors
    ///
    /// Propagates failures from [`SessionStore::export`] and
    /// [`encode_bundle`].
    pub fn export_blob(&self) -> Result<String, SessionError> {
        encode_bundle(&self.export()?)
    }

    /// Writes each file in `update` atomically, leaving other files alone.
    ///
    /// Returns the number of files written.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Io`] when the directory cannot be created or a
    /// file cannot be written. Files written before the failure stay in place.
    pub fn apply_update(&self, update: &CredentialBundle) -> Result<usize, SessionError> {
        create_private_dir(&self.dir)
            .map_err(|source| SessionError::io("create directory", &self.dir, source))?;
        for (name, contents) in update.iter() {
            let path = self.dir.join(name);
            atomic_write(&path, contents)
                .map_err(|source| SessionError::io("write credential", &path, source))?;
        }
        debug!(
            target: STORE_TARGET,
            files = update.len(),
            "persisted credential update"
        );
        Ok(update.len())
    }

    /// Chooses the session origin for the next connect.
    ///
    /// A valid local session always wins and the blob is ignored. Otherwise
    /// the blob, when present, is restored. A restore failure is logged and
    /// reported as [`SessionOrigin::Fresh`] so the daemon falls back to
    /// pairing.
    #[must_use]
    pub fn prepare(&self, blob: Option<&str>) -> SessionOrigin {
        if self.has_valid_local_session() {
            if blob.is_some() {
                debug!(
                    target: STORE_TARGET,
                    "local session present; ignoring supplied blob"
                );
            }
            return SessionOrigin::Local;
        }

        match self.restore(blob) {
            Ok(RestoreOutcome::NotProvided) => SessionOrigin::Fresh,
            Ok(RestoreOutcome::Restored(bundle)) => {
                if !bundle.contains(PRIMARY_RECORD) {
                    warn!(
                        target: STORE_TARGET,
                        "restored blob has no {PRIMARY_RECORD}; pairing will be required"
                    );
                    return SessionOrigin::Fresh;
                }
                SessionOrigin::Restored
            }
            Err(error) => {
                warn!(
                    target: STORE_TARGET,
                    error = %error,
                    "session restore failed; continuing without credentials"
                );
                SessionOrigin::Fresh
            }
        }
    }
}

fn create_private_dir(path: &Path) -> io::Result<()> {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o700);
    }
    builder.create(path)
}

//! Derives and prepares the filesystem locations used for session state.
//!
//! The credential directory must exist before the protocol layer writes its
//! first credential file, and its parent must exist so a restore can stage a
//! replacement directory beside it.

use std::fs::DirBuilder;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::Config;

/// Canonical paths for session artefacts.
#[derive(Debug, Clone)]
pub struct SessionPaths {
    session_dir: PathBuf,
    export_path: Option<PathBuf>,
}

impl SessionPaths {
    /// Derives the paths from configuration and creates the credential
    /// directory with owner-only permissions.
    ///
    /// # Errors
    ///
    /// Returns [`SessionPathsError`] when the directory cannot be created.
    pub fn from_config(config: &Config) -> Result<Self, SessionPathsError> {
        let session_dir = config.session_dir().as_std_path().to_path_buf();
        create_private_dir(&session_dir)?;
        let export_path = config
            .session_export_path()
            .map(|path| path.as_std_path().to_path_buf());
        if let Some(parent) = export_path
            .as_deref()
            .and_then(Path::parent)
            .filter(|parent| !parent.as_os_str().is_empty())
        {
            create_private_dir(parent)?;
        }
        Ok(Self {
            session_dir,
            export_path,
        })
    }

    /// Directory holding the credential files.
    #[must_use]
    pub fn session_dir(&self) -> &Path {
        self.session_dir.as_path()
    }

    /// File receiving the first-pairing export, when configured.
    #[must_use]
    pub fn export_path(&self) -> Option<&Path> {
        self.export_path.as_deref()
    }
}

fn create_private_dir(path: &Path) -> Result<(), SessionPathsError> {
    let mut builder = DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o700);
    }

    if let Err(source) = builder.create(path)
        && source.kind() != io::ErrorKind::AlreadyExists
    {
        return Err(SessionPathsError::CreateDirectory {
            path: path.to_path_buf(),
            source,
        });
    }
    if !path.is_dir() {
        return Err(SessionPathsError::NotADirectory {
            path: path.to_path_buf(),
        });
    }
    Ok(())
}

/// Errors raised while preparing session paths.
#[derive(Debug, Error)]
pub enum SessionPathsError {
    /// Creating a directory failed.
    #[error("failed to prepare directory '{}': {source}", path.display())]
    CreateDirectory {
        /// Directory that could not be created.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// The configured path exists but is not a directory.
    #[error("'{}' exists but is not a directory", path.display())]
    NotADirectory {
        /// Offending path.
        path: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use camino::Utf8PathBuf;
    use tempfile::TempDir;

    use super::*;

    fn utf8(path: &Path) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(path.to_path_buf()).expect("temp path should be UTF-8")
    }

    #[test]
    fn creates_nested_session_directory() {
        let temp = TempDir::new().expect("temp dir");
        let dir = temp.path().join("state").join("session");
        let config = Config {
            session_dir: Some(utf8(&dir)),
            ..Config::default()
        };

        let paths = SessionPaths::from_config(&config).expect("paths should prepare");
        assert!(paths.session_dir().is_dir());
        assert!(paths.export_path().is_none());
    }

    #[test]
    fn prepares_export_parent() {
        let temp = TempDir::new().expect("temp dir");
        let export = temp.path().join("exports").join("session.txt");
        let config = Config {
            session_dir: Some(utf8(&temp.path().join("session"))),
            session_export_path: Some(utf8(&export)),
            ..Config::default()
        };

        let paths = SessionPaths::from_config(&config).expect("paths should prepare");
        assert_eq!(paths.export_path(), Some(export.as_path()));
        assert!(temp.path().join("exports").is_dir());
    }

    #[test]
    fn rejects_file_in_place_of_directory() {
        let temp = TempDir::new().expect("temp dir");
        let file = temp.path().join("session");
        std::fs::write(&file, b"not a directory").expect("write file");
        let config = Config {
            session_dir: Some(utf8(&file)),
            ..Config::default()
        };

        let error = SessionPaths::from_config(&config).expect_err("file should be rejected");
        assert!(matches!(error, SessionPathsError::NotADirectory { .. }));
    }
}

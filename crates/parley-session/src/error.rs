//! Error types for credential storage.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Failures raised while restoring, exporting or updating credentials.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The session blob could not be decoded.
    #[error("session blob is malformed: {message}")]
    Decode {
        /// What was wrong with the blob.
        message: String,
    },

    /// The bundle could not be serialised into a blob.
    #[error("failed to encode session bundle: {0}")]
    Encode(#[source] serde_json::Error),

    /// A credential file name would escape the session directory.
    #[error("invalid credential file name '{name}'")]
    InvalidFileName {
        /// Offending name.
        name: String,
    },

    /// Filesystem access failed.
    #[error("failed to {operation} '{}': {source}", path.display())]
    Io {
        /// Short description of the attempted operation.
        operation: &'static str,
        /// Path being accessed.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
}

impl SessionError {
    pub(crate) fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    pub(crate) fn invalid_file_name(name: &str) -> Self {
        Self::InvalidFileName {
            name: name.to_owned(),
        }
    }

    pub(crate) fn io(operation: &'static str, path: &Path, source: io::Error) -> Self {
        Self::Io {
            operation,
            path: path.to_path_buf(),
            source,
        }
    }
}

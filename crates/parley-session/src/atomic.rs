use std::fs;
use std::io::{self, Write};
use std::path::Path;

use tempfile::Builder;

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

use crate::bundle::CredentialBundle;
use crate::STORE_TARGET;
use crate::error::SessionError;

const STAGING_PREFIX: &str = ".parley-staging-";
const PREVIOUS_PREFIX: &str = ".parley-previous-";

/// Writes the provided bytes to the path using an atomic persist step.
///
/// Data is flushed and fsync'd before the temporary file is renamed into
/// place so readers never observe a partially written payload. The file is
/// created readable by its owner only.
///
/// # Errors
///
/// Returns the underlying IO error when the parent directory is missing or
/// any write step fails.
pub fn atomic_write(path: &Path, contents: &[u8]) -> io::Result<()> {
    let directory = path
        .parent()
        .map(|parent| {
            if parent.as_os_str().is_empty() {
                Path::new(".")
            } else {
                parent
            }
        })
        .ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                "target path did not have a parent directory",
            )
        })?;

    let prefix = path
        .file_name()
        .and_then(|name| name.to_str())
        .map_or_else(|| ".parley.".to_owned(), |name| format!(".{name}."));
    let mut builder = Builder::new();
    builder.prefix(&prefix);
    #[cfg(unix)]
    {
        use std::fs::Permissions;
        builder.permissions(Permissions::from_mode(0o600));
    }

    let mut file = builder.tempfile_in(directory)?;
    file.write_all(contents)?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|error| error.error)?;
    Ok(())
}

/// Replaces `target` with a directory holding exactly the bundle's files.
///
/// The bundle is written into a staging directory beside `target`, the old
/// directory is moved aside, and the staging directory is renamed into its
/// place. The old contents are removed only after the swap succeeds.
pub(crate) fn replace_directory(
    target: &Path,
    bundle: &CredentialBundle,
) -> Result<(), SessionError> {
    let parent = target
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent)
        .map_err(|source| SessionError::io("create directory", parent, source))?;

    let staging = Builder::new()
        .prefix(STAGING_PREFIX)
        .tempdir_in(parent)
        .map_err(|source| SessionError::io("create staging directory", parent, source))?;
    for (name, contents) in bundle.iter() {
        let path = staging.path().join(name);
        write_new_file(&path, contents)
            .map_err(|source| SessionError::io("write credential", &path, source))?;
    }

    let previous = if target.exists() {
        let holder = Builder::new()
            .prefix(PREVIOUS_PREFIX)
            .tempdir_in(parent)
            .map_err(|source| SessionError::io("create backup directory", parent, source))?;
        let moved = holder.path().join("session");
        fs::rename(target, &moved)
            .map_err(|source| SessionError::io("move aside", target, source))?;
        Some((holder, moved))
    } else {
        None
    };

    if let Err(source) = fs::rename(staging.path(), target) {
        if let Some((_, moved)) = &previous
            && let Err(rollback) = fs::rename(moved, target)
        {
            tracing::error!(
                target: STORE_TARGET,
                error = %rollback,
                path = %target.display(),
                "failed to restore previous credential directory"
            );
        }
        return Err(SessionError::io("install", target, source));
    }
    // `previous` drops here and removes the old credentials.
    drop(previous);
    Ok(())
}

fn write_new_file(path: &Path, contents: &[u8]) -> io::Result<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path)?;
    file.write_all(contents)?;
    file.sync_all()
}

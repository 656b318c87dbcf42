//! In-memory representation of the credential directory.

use std::collections::BTreeMap;
use std::collections::btree_map;

use crate::error::SessionError;

/// Named credential files and their raw contents.
///
/// Names are plain file names: no separators, no leading dot and never `.` or
/// `..`. Iteration order is lexical, which keeps encoded blobs stable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialBundle {
    files: BTreeMap<String, Vec<u8>>,
}

impl CredentialBundle {
    /// Creates an empty bundle.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a file, returning the previous contents.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidFileName`] when `name` could escape the
    /// credential directory.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        contents: impl Into<Vec<u8>>,
    ) -> Result<Option<Vec<u8>>, SessionError> {
        let name = name.into();
        validate_file_name(&name)?;
        Ok(self.files.insert(name, contents.into()))
    }

    /// Returns the contents stored under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&[u8]> {
        self.files.get(name).map(Vec::as_slice)
    }

    /// Reports whether a file called `name` is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.files.contains_key(name)
    }

    /// Number of files in the bundle.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Reports whether the bundle holds no files.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Iterates over `(name, contents)` pairs in lexical order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[u8])> {
        self.files
            .iter()
            .map(|(name, contents)| (name.as_str(), contents.as_slice()))
    }
}

impl<'a> IntoIterator for &'a CredentialBundle {
    type Item = (&'a String, &'a Vec<u8>);
    type IntoIter = btree_map::Iter<'a, String, Vec<u8>>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.iter()
    }
}

/// Checks that `name` is a single, visible path component.
///
/// # Errors
///
/// Returns [`SessionError::InvalidFileName`] for empty names, names with path
/// separators or NUL bytes, and names beginning with a dot.
pub fn validate_file_name(name: &str) -> Result<(), SessionError> {
    let invalid = name.is_empty()
        || name.starts_with('.')
        || name.contains(['/', '\\', '\0']);
    if invalid {
        return Err(SessionError::invalid_file_name(name));
    }
    Ok(())
}

//! Portable text encoding for a [`CredentialBundle`].
//!
//! A blob is the standard base64 encoding of a JSON envelope:
//!
//! ```json
//! {"version":1,"files":{"creds.json":"<base64 of file bytes>"}}
//! ```
//!
//! File contents are base64 encoded individually so binary key material
//! survives the trip through JSON unchanged.

use std::collections::BTreeMap;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use serde::{Deserialize, Serialize};

use crate::bundle::{CredentialBundle, validate_file_name};
use crate::error::SessionError;

/// Envelope version written by [`encode_bundle`].
pub const BLOB_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct Envelope {
    version: u32,
    files: BTreeMap<String, String>,
}

/// Encodes a bundle as a single line of ASCII text.
///
/// # Errors
///
/// Returns [`SessionError::Encode`] if the envelope cannot be serialised.
pub fn encode_bundle(bundle: &CredentialBundle) -> Result<String, SessionError> {
    let files = bundle
        .iter()
        .map(|(name, contents)| (name.to_owned(), BASE64_STANDARD.encode(contents)))
        .collect();
    let envelope = Envelope {
        version: BLOB_VERSION,
        files,
    };
    let json = serde_json::to_vec(&envelope).map_err(SessionError::Encode)?;
    Ok(BASE64_STANDARD.encode(json))
}

/// Decodes a blob produced by [`encode_bundle`].
///
/// Surrounding whitespace is ignored so blobs pasted into environment files
/// with a trailing newline still decode.
///
/// # Errors
///
/// Returns [`SessionError::Decode`] when the outer encoding, the envelope, the
/// version, a file name or any file's contents are malformed.
pub fn decode_bundle(blob: &str) -> Result<CredentialBundle, SessionError> {
    let json = BASE64_STANDARD
        .decode(blob.trim())
        .map_err(|error| SessionError::decode(format!("outer encoding: {error}")))?;
    let envelope: Envelope = serde_json::from_slice(&json)
        .map_err(|error| SessionError::decode(format!("envelope: {error}")))?;
    if envelope.version != BLOB_VERSION {
        return Err(SessionError::decode(format!(
            "unsupported version {}",
            envelope.version
        )));
    }

    let mut bundle = CredentialBundle::new();
    for (name, encoded) in envelope.files {
        if validate_file_name(&name).is_err() {
            return Err(SessionError::decode(format!("invalid file name '{name}'")));
        }
        let contents = BASE64_STANDARD
            .decode(&encoded)
            .map_err(|error| SessionError::decode(format!("contents of '{name}': {error}")))?;
        bundle.insert(name, contents)?;
    }
    Ok(bundle)
}

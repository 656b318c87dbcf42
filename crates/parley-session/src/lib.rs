//! Durable credential storage for the Parley daemon.
//!
//! The protocol layer keeps its credentials as a flat directory of named
//! files. This crate owns that directory: it can seed it from a portable
//! session blob, snapshot it back into a blob, and apply partial credential
//! updates as the protocol rotates keys.
//!
//! Every write goes through a temporary file or a staging directory that is
//! renamed into place, so a reader never observes a half-written credential.

mod atomic;
mod bundle;
mod codec;
mod error;
mod store;

const STORE_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::store");

pub use atomic::atomic_write;
pub use bundle::{CredentialBundle, validate_file_name};
pub use codec::{BLOB_VERSION, decode_bundle, encode_bundle};
pub use error::SessionError;
pub use store::{PRIMARY_RECORD, RestoreOutcome, SessionOrigin, SessionStore};

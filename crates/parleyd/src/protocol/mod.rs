//! Seam between the daemon and the messaging protocol implementation.
//!
//! A [`Connector`] opens one connection attempt and hands back a [`Link`] for
//! outbound calls plus a channel of [`ProtocolEvent`]s. The supervisor owns
//! the receiving end and drains it on its own thread; the protocol
//! implementation is free to produce events from any thread it likes.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::Receiver;

use thiserror::Error;

use parley_commands::{Address, InboundMessage, Outbox};
use parley_session::CredentialBundle;

/// Parameters for one connection attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectOptions {
    /// Directory holding the credential files the protocol should load.
    pub session_dir: PathBuf,
    /// One-based attempt number since the last successful open.
    pub attempt: u32,
}

/// Events emitted by a live connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolEvent {
    /// The handshake is in progress.
    Connecting,
    /// The connection is ready for traffic.
    Open,
    /// The connection ended.
    Close(DisconnectReason),
    /// The protocol rotated some credential files.
    CredentialsUpdated(CredentialBundle),
    /// A chat message arrived.
    MessageReceived(InboundMessage),
}

/// Why a connection ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisconnectReason {
    /// The account unlinked this device; credentials are no longer valid.
    LoggedOut,
    /// The network connection dropped.
    ConnectionLost,
    /// The server closed the connection.
    ConnectionClosed,
    /// Another client took over the session.
    ConnectionReplaced,
    /// The server asked for a fresh connection.
    RestartRequired,
    /// The handshake or a keep-alive timed out.
    TimedOut,
    /// The attempt failed before any event was produced.
    ConnectFailed {
        /// Rendered connect error.
        message: String,
    },
    /// The event channel closed without a close event.
    StreamEnded,
    /// Any other protocol status code.
    Other {
        /// Protocol status code.
        code: u16,
    },
}

/// Retry classification of a [`DisconnectReason`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseClass {
    /// Reconnecting may succeed.
    Recoverable,
    /// Reconnecting cannot succeed without re-pairing.
    LoggedOut,
}

impl DisconnectReason {
    /// Classifies the reason for the retry policy.
    #[must_use]
    pub fn classify(&self) -> CloseClass {
        match self {
            Self::LoggedOut => CloseClass::LoggedOut,
            _ => CloseClass::Recoverable,
        }
    }
}

impl std::fmt::Display for DisconnectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LoggedOut => f.write_str("logged out"),
            Self::ConnectionLost => f.write_str("connection lost"),
            Self::ConnectionClosed => f.write_str("connection closed"),
            Self::ConnectionReplaced => f.write_str("connection replaced"),
            Self::RestartRequired => f.write_str("restart required"),
            Self::TimedOut => f.write_str("timed out"),
            Self::ConnectFailed { message } => write!(f, "connect failed: {message}"),
            Self::StreamEnded => f.write_str("event stream ended"),
            Self::Other { code } => write!(f, "status {code}"),
        }
    }
}

/// Presence states announced by the heartbeat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    /// Online and reachable.
    Available,
}

/// Errors raised while opening a connection.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConnectError {
    /// The transport could not be established.
    #[error("transport unavailable: {message}")]
    Transport {
        /// Description of the failure.
        message: String,
    },
    /// The credentials on disk could not be loaded.
    #[error("credentials unusable: {message}")]
    Credentials {
        /// Description of the failure.
        message: String,
    },
}

/// Errors raised while requesting a pairing code.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PairingError {
    /// No pairing address is configured.
    #[error("no pairing address configured; set PARLEY_PAIRING_ADDRESS")]
    MissingAddress,
    /// The protocol refused the request.
    #[error("pairing code request for '{address}' failed: {message}")]
    Rejected {
        /// Address the code was requested for.
        address: String,
        /// Reason given by the protocol.
        message: String,
    },
}

/// Outbound side of a live connection.
pub trait Link: Outbox {
    /// Reports whether the loaded credentials carry a registered identity.
    fn is_registered(&self) -> bool;

    /// Requests a pairing code that links this device to `address`.
    ///
    /// # Errors
    ///
    /// Returns [`PairingError`] when the protocol refuses the request.
    fn request_pairing_code(&self, address: &str) -> Result<String, PairingError>;

    /// Announces presence, globally when `to` is `None`.
    ///
    /// # Errors
    ///
    /// Returns the delivery failure reported by the protocol.
    fn send_presence(
        &self,
        to: Option<&Address>,
        presence: Presence,
    ) -> Result<(), parley_commands::DeliveryError>;

    /// Ends the connection. Further events may still be queued.
    fn close(&self);
}

/// A live connection attempt.
pub struct Connection {
    /// Outbound handle shared with the heartbeat and commands.
    pub link: Arc<dyn Link>,
    /// Events produced by the protocol for this attempt.
    pub events: Receiver<ProtocolEvent>,
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection").finish_non_exhaustive()
    }
}

/// Factory for connection attempts.
pub trait Connector: Send + Sync {
    /// Opens one connection attempt.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectError`] when no connection could be started.
    fn connect(&self, options: &ConnectOptions) -> Result<Connection, ConnectError>;
}

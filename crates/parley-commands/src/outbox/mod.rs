//! Outbound messaging capability handed to commands.

use std::fmt;

use thiserror::Error;

use crate::message::Address;

/// Identifier of a sent message, used to edit it later.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MessageKey(String);

impl MessageKey {
    /// Wraps a protocol message identifier.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the identifier as text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Payload accepted by [`Outbox::send`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundPayload {
    /// Plain text.
    Text(String),
    /// Sticker image.
    Sticker {
        /// Encoded image bytes.
        data: Vec<u8>,
        /// MIME type of `data`.
        mime_type: String,
    },
    /// Replacement text for a previously sent message.
    Edit {
        /// Message being edited.
        target: MessageKey,
        /// New text.
        text: String,
    },
}

impl OutboundPayload {
    /// Builds a text payload.
    #[must_use]
    pub fn text(body: impl Into<String>) -> Self {
        Self::Text(body.into())
    }
}

/// Delivery failures reported by the protocol layer.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DeliveryError {
    /// The connection is not open.
    #[error("not connected")]
    NotConnected,
    /// The protocol layer refused the payload.
    #[error("message to '{to}' was rejected: {message}")]
    Rejected {
        /// Intended recipient.
        to: Address,
        /// Reason given by the protocol layer.
        message: String,
    },
}

/// Capability to send messages.
///
/// Implemented by the protocol link. Sends may fail at any time because the
/// connection can drop between the inbound message and the reply.
pub trait Outbox: Send + Sync {
    /// Sends `payload` to `to` and returns the key of the sent message.
    ///
    /// # Errors
    ///
    /// Returns [`DeliveryError`] when the message could not be handed to the
    /// protocol layer.
    fn send(&self, to: &Address, payload: OutboundPayload) -> Result<MessageKey, DeliveryError>;
}

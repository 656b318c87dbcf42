//! Command handling for the Parley daemon.
//!
//! Inbound messages arrive as [`InboundMessage`] values. The [`Dispatcher`]
//! extracts their text, recognises a prefixed command token, resolves it in
//! a [`CommandRegistry`] and runs the matching [`Command`] with a
//! [`CommandContext`]. Commands answer through the [`Outbox`] capability,
//! which the daemon implements on top of its protocol link.
//!
//! The built-in commands live in [`builtin`].

pub mod builtin;
pub mod command;
pub mod dispatch;
pub mod message;
pub mod outbox;
pub mod registry;

#[cfg(test)]
mod tests;

pub use self::command::{Category, Command, CommandContext, CommandError};
pub use self::dispatch::{DispatchOutcome, Dispatcher, HELP_COMMAND, Invocation, parse_invocation};
pub use self::message::{
    Address, InboundMessage, MediaKind, MediaMessage, MessageContent, QuotedMessage,
};
pub use self::outbox::{DeliveryError, MessageKey, OutboundPayload, Outbox};
pub use self::registry::{CommandDescriptor, CommandRegistry, RegistryError};

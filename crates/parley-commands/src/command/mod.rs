//! The command abstraction and the context a command runs in.

use std::time::Duration;

use strum::Display;
use thiserror::Error;

use crate::message::{Address, InboundMessage};
use crate::outbox::{DeliveryError, MessageKey, OutboundPayload, Outbox};
use crate::registry::CommandRegistry;

/// Grouping used by help listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Category {
    /// Everyday commands.
    General,
    /// Commands that work on attached media.
    Media,
    /// Anything else.
    Other,
}

/// Failures raised by a command body.
#[derive(Debug, Error)]
pub enum CommandError {
    /// A reply could not be delivered.
    #[error("delivery failed: {0}")]
    Delivery(#[from] DeliveryError),
    /// The command could not complete.
    #[error("{message}")]
    Failed {
        /// Human-readable explanation sent back to the user.
        message: String,
    },
}

impl CommandError {
    /// Builds a [`CommandError::Failed`].
    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
        }
    }
}

/// Behaviour bound to a command name.
pub trait Command: Send + Sync {
    /// Runs the command.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError`] when the command cannot complete; the
    /// dispatcher reports it to the user.
    fn execute(&self, ctx: &CommandContext<'_>) -> Result<(), CommandError>;
}

impl<F> Command for F
where
    F: Fn(&CommandContext<'_>) -> Result<(), CommandError> + Send + Sync,
{
    fn execute(&self, ctx: &CommandContext<'_>) -> Result<(), CommandError> {
        self(ctx)
    }
}

/// Everything a command may observe or use while running.
pub struct CommandContext<'a> {
    outbox: &'a dyn Outbox,
    message: &'a InboundMessage,
    command: &'a str,
    args: &'a [String],
    prefix: char,
    registry: &'a CommandRegistry,
    uptime: Duration,
}

impl<'a> CommandContext<'a> {
    /// Assembles a context. Called by the dispatcher and by tests.
    #[must_use]
    pub fn new(
        outbox: &'a dyn Outbox,
        message: &'a InboundMessage,
        command: &'a str,
        args: &'a [String],
        prefix: char,
        registry: &'a CommandRegistry,
        uptime: Duration,
    ) -> Self {
        Self {
            outbox,
            message,
            command,
            args,
            prefix,
            registry,
            uptime,
        }
    }

    /// The message that triggered the command.
    #[must_use]
    pub fn message(&self) -> &InboundMessage {
        self.message
    }

    /// Canonical name of the running command.
    #[must_use]
    pub fn command(&self) -> &str {
        self.command
    }

    /// Whitespace-separated arguments after the command token.
    #[must_use]
    pub fn args(&self) -> &[String] {
        self.args
    }

    /// Command prefix in effect.
    #[must_use]
    pub fn prefix(&self) -> char {
        self.prefix
    }

    /// Read-only view of every registered command.
    #[must_use]
    pub fn registry(&self) -> &CommandRegistry {
        self.registry
    }

    /// Time since the daemon started.
    #[must_use]
    pub fn uptime(&self) -> Duration {
        self.uptime
    }

    /// Sender display name, falling back to the address.
    #[must_use]
    pub fn sender_name(&self) -> &str {
        self.message.sender_label()
    }

    /// Address of the sender.
    #[must_use]
    pub fn sender(&self) -> &Address {
        &self.message.sender
    }

    /// Chat that replies go to.
    #[must_use]
    pub fn reply_to(&self) -> &Address {
        &self.message.chat
    }

    /// Sends an arbitrary payload to the reply address.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::Delivery`] if the outbox rejects the payload.
    pub fn send(&self, payload: OutboundPayload) -> Result<MessageKey, CommandError> {
        Ok(self.outbox.send(self.reply_to(), payload)?)
    }

    /// Sends a text reply.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::Delivery`] if the outbox rejects the reply.
    pub fn reply(&self, text: impl Into<String>) -> Result<MessageKey, CommandError> {
        self.send(OutboundPayload::text(text))
    }
}

//! Routes inbound messages to registered commands.
//!
//! The dispatcher extracts the command-bearing text, matches the configured
//! prefix, resolves the command and runs it. Failures inside a command,
//! including panics, are contained here: the user receives one error reply
//! and the caller always gets a [`DispatchOutcome`] back.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::command::CommandContext;
use crate::message::{Address, InboundMessage};
use crate::outbox::{OutboundPayload, Outbox};
use crate::registry::CommandRegistry;

const DISPATCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::dispatch");

/// Name of the command that lists every other command.
pub const HELP_COMMAND: &str = "menu";

/// Result of dispatching one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The message carried no command.
    Ignored,
    /// The command token matched nothing.
    UnknownCommand {
        /// Lower-cased token.
        token: String,
    },
    /// The command ran to completion.
    Completed {
        /// Canonical command name.
        command: String,
    },
    /// The command returned an error or panicked.
    Failed {
        /// Canonical command name.
        command: String,
        /// Rendered failure.
        error: String,
    },
}

/// Parsed command invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Lower-cased command token.
    pub token: String,
    /// Remaining whitespace-separated words.
    pub args: Vec<String>,
}

/// Splits `text` into a command token and arguments.
///
/// Returns `None` when `text` does not start with `prefix` or nothing
/// follows the prefix.
#[must_use]
pub fn parse_invocation(text: &str, prefix: char) -> Option<Invocation> {
    let rest = text.strip_prefix(prefix)?;
    let mut words = rest.split_whitespace();
    let token = words.next()?.to_lowercase();
    Some(Invocation {
        token,
        args: words.map(str::to_owned).collect(),
    })
}

/// Routes messages to commands held in a shared registry.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Arc<CommandRegistry>,
    prefix: char,
    started_at: Instant,
}

impl Dispatcher {
    /// Creates a dispatcher. Uptime reported to commands counts from here.
    #[must_use]
    pub fn new(registry: Arc<CommandRegistry>, prefix: char) -> Self {
        Self {
            registry,
            prefix,
            started_at: Instant::now(),
        }
    }

    /// Registry consulted for every message.
    #[must_use]
    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// Prefix that marks a command.
    #[must_use]
    pub fn prefix(&self) -> char {
        self.prefix
    }

    /// Handles one inbound message. Never fails.
    pub fn dispatch(&self, message: &InboundMessage, outbox: &dyn Outbox) -> DispatchOutcome {
        let Some(invocation) = message
            .text_body()
            .and_then(|text| parse_invocation(text, self.prefix))
        else {
            return DispatchOutcome::Ignored;
        };

        let Some(descriptor) = self.registry.resolve(&invocation.token) else {
            debug!(
                target: DISPATCH_TARGET,
                token = %invocation.token,
                sender = %message.sender,
                "unknown command"
            );
            let text = format!(
                "❓ Unknown command *{prefix}{token}*. Try *{prefix}{HELP_COMMAND}*",
                prefix = self.prefix,
                token = invocation.token,
            );
            send_best_effort(outbox, &message.chat, text);
            return DispatchOutcome::UnknownCommand {
                token: invocation.token,
            };
        };

        let command = descriptor.name().to_owned();
        info!(
            target: DISPATCH_TARGET,
            command = %command,
            args = invocation.args.len(),
            sender = %message.sender,
            "command received"
        );
        let ctx = CommandContext::new(
            outbox,
            message,
            &command,
            &invocation.args,
            self.prefix,
            &self.registry,
            self.started_at.elapsed(),
        );
        let handler = descriptor.handler();
        let result = panic::catch_unwind(AssertUnwindSafe(|| handler.execute(&ctx)));

        let error = match result {
            Ok(Ok(())) => return DispatchOutcome::Completed { command },
            Ok(Err(error)) => error.to_string(),
            Err(payload) => format!("command panicked: {}", panic_message(payload.as_ref())),
        };
        warn!(
            target: DISPATCH_TARGET,
            command = %command,
            error = %error,
            "command failed"
        );
        let text = format!("❌ {prefix}{command} failed: {error}", prefix = self.prefix);
        send_best_effort(outbox, &message.chat, text);
        DispatchOutcome::Failed { command, error }
    }
}

fn send_best_effort(outbox: &dyn Outbox, to: &Address, text: String) {
    if let Err(error) = outbox.send(to, OutboundPayload::Text(text)) {
        warn!(
            target: DISPATCH_TARGET,
            error = %error,
            to = %to,
            "failed to deliver reply"
        );
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}

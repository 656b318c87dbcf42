use std::sync::Arc;
use std::time::Instant;

use crate::command::{Category, Command, CommandContext, CommandError};
use crate::outbox::OutboundPayload;
use crate::registry::CommandDescriptor;

/// Measures the round trip of one send.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ping;

pub(super) fn descriptor() -> CommandDescriptor {
    CommandDescriptor::new(
        "ping",
        Category::General,
        "Check bot response time",
        Arc::new(Ping),
    )
    .with_aliases(["p"])
}

impl Command for Ping {
    fn execute(&self, ctx: &CommandContext<'_>) -> Result<(), CommandError> {
        let started = Instant::now();
        let key = ctx.reply("🏓 Pinging...")?;
        let latency = started.elapsed().as_millis();
        ctx.send(OutboundPayload::Edit {
            target: key,
            text: format!("🏓 *Pong!*\n\n⚡ Response time: *{latency}ms*"),
        })?;
        Ok(())
    }
}

use std::env::consts::{ARCH, OS};
use std::sync::Arc;

use super::{BOT_NAME, format_uptime};
use crate::command::{Category, Command, CommandContext, CommandError};
use crate::registry::CommandDescriptor;

/// Reports build and runtime details.
#[derive(Debug, Clone, Copy, Default)]
pub struct Info;

pub(super) fn descriptor() -> CommandDescriptor {
    CommandDescriptor::new(
        "info",
        Category::General,
        "Show bot system information",
        Arc::new(Info),
    )
    .with_aliases(["botinfo", "status"])
}

impl Command for Info {
    fn execute(&self, ctx: &CommandContext<'_>) -> Result<(), CommandError> {
        ctx.reply(format!(
            "╭━━━━━━━━━━━━━━━━━━━━━╮\n\
             ┃   📊 *SYSTEM INFO*\n\
             ┃━━━━━━━━━━━━━━━━━━━━━\n\
             ┃ 🤖 Bot: *{BOT_NAME}*\n\
             ┃ 📌 Version: *{version}*\n\
             ┃ ⏱️ Uptime: *{uptime}*\n\
             ┃ 🖥️ Platform: *{OS}/{ARCH}*\n\
             ┃ 🧩 Commands: *{count}*\n\
             ╰━━━━━━━━━━━━━━━━━━━━━╯",
            version = env!("CARGO_PKG_VERSION"),
            uptime = format_uptime(ctx.uptime()),
            count = ctx.registry().len(),
        ))?;
        Ok(())
    }
}

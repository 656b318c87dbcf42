use std::sync::Arc;

use time::OffsetDateTime;
use time::macros::format_description;

use super::{BOT_NAME, format_uptime};
use crate::command::{Category, Command, CommandContext, CommandError};
use crate::registry::CommandDescriptor;

/// Confirms the bot is online.
#[derive(Debug, Clone, Copy, Default)]
pub struct Alive;

pub(super) fn descriptor() -> CommandDescriptor {
    CommandDescriptor::new(
        "alive",
        Category::General,
        "Check if bot is online",
        Arc::new(Alive),
    )
    .with_aliases(["bot", "test"])
}

impl Command for Alive {
    fn execute(&self, ctx: &CommandContext<'_>) -> Result<(), CommandError> {
        let now = OffsetDateTime::now_utc();
        let date = now
            .format(format_description!("[year]-[month]-[day]"))
            .map_err(|error| CommandError::failed(format!("cannot format date: {error}")))?;
        let clock = now
            .format(format_description!("[hour]:[minute]:[second]"))
            .map_err(|error| CommandError::failed(format!("cannot format time: {error}")))?;

        ctx.reply(format!(
            "╭━━━━━━━━━━━━━━━━━━━━━╮\n\
             ┃   🤖 *{name}*\n\
             ┃━━━━━━━━━━━━━━━━━━━━━\n\
             ┃ ✅ Status: *ONLINE*\n\
             ┃ ⏱️ Uptime: *{uptime}*\n\
             ┃ 👤 User: *{sender}*\n\
             ┃ 📅 {date}\n\
             ┃ ⏰ {clock} UTC\n\
             ╰━━━━━━━━━━━━━━━━━━━━━╯\n\
             \n\
             💚 Bot is running smoothly!",
            name = BOT_NAME.to_uppercase(),
            uptime = format_uptime(ctx.uptime()),
            sender = ctx.sender_name(),
        ))?;
        Ok(())
    }
}

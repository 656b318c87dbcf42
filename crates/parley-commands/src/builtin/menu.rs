use std::sync::Arc;

use super::BOT_NAME;
use crate::command::{Category, Command, CommandContext, CommandError};
use crate::registry::CommandDescriptor;

/// Lists every command grouped by category.
#[derive(Debug, Clone, Copy, Default)]
pub struct Menu;

pub(super) fn descriptor() -> CommandDescriptor {
    CommandDescriptor::new(
        "menu",
        Category::General,
        "Show all available commands",
        Arc::new(Menu),
    )
    .with_aliases(["help", "commands"])
}

impl Command for Menu {
    fn execute(&self, ctx: &CommandContext<'_>) -> Result<(), CommandError> {
        ctx.reply(render(ctx))?;
        Ok(())
    }
}

fn render(ctx: &CommandContext<'_>) -> String {
    let prefix = ctx.prefix();
    let mut text = format!(
        "╭━━━━━━━━━━━━━━━━━━━━━╮\n\
         ┃   🤖 *{name}*\n\
         ┃━━━━━━━━━━━━━━━━━━━━━\n\
         ┃ 👋 Hello, *{sender}*!\n\
         ┃ 📌 Prefix: *{prefix}*\n\
         ╰━━━━━━━━━━━━━━━━━━━━━╯\n",
        name = BOT_NAME.to_uppercase(),
        sender = ctx.sender_name(),
    );

    for (category, commands) in ctx.registry().by_category() {
        let heading = category.to_string().to_uppercase();
        text.push_str(&format!("\n╭━━━ *{heading}* ━━━╮\n"));
        for command in commands {
            let aliases = if command.aliases().is_empty() {
                String::new()
            } else {
                format!(" ({})", command.aliases().join(", "))
            };
            text.push_str(&format!(
                "┃ {prefix}{name}{aliases}\n┃   └ {description}\n",
                name = command.name(),
                description = command.description(),
            ));
        }
        text.push_str(&format!("╰{}╯\n", "━".repeat(20)));
    }

    text.push_str("\n💡 *Tip:* Type any command to use it!");
    text
}

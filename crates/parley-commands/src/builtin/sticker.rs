use std::sync::Arc;

use crate::command::{Category, Command, CommandContext, CommandError};
use crate::outbox::OutboundPayload;
use crate::registry::CommandDescriptor;

/// MIME type attached to outgoing stickers.
pub const STICKER_MIME_TYPE: &str = "image/webp";

/// Sends an attached or quoted image back as a sticker.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sticker;

pub(super) fn descriptor() -> CommandDescriptor {
    CommandDescriptor::new(
        "sticker",
        Category::Media,
        "Convert image to sticker (reply to an image)",
        Arc::new(Sticker),
    )
    .with_aliases(["s", "stiker"])
}

impl Command for Sticker {
    fn execute(&self, ctx: &CommandContext<'_>) -> Result<(), CommandError> {
        let Some(image) = ctx.message().image() else {
            ctx.reply(format!(
                "❌ Please reply to an image or send an image with the command!\n\n\
                 Usage: Send an image with caption *{}{}*",
                ctx.prefix(),
                ctx.command(),
            ))?;
            return Ok(());
        };
        if image.data.is_empty() {
            return Err(CommandError::failed(
                "Failed to create sticker. Please try again with a different image.",
            ));
        }

        ctx.reply("⏳ Creating sticker...")?;
        ctx.send(OutboundPayload::Sticker {
            data: image.data.clone(),
            mime_type: STICKER_MIME_TYPE.to_owned(),
        })?;
        Ok(())
    }
}

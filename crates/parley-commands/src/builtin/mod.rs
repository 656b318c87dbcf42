//! Commands shipped with the daemon.

mod alive;
mod info;
mod menu;
mod ping;
mod sticker;

use std::time::Duration;

use crate::registry::{CommandDescriptor, CommandRegistry, RegistryError};

pub use alive::Alive;
pub use info::Info;
pub use menu::Menu;
pub use ping::Ping;
pub use sticker::{STICKER_MIME_TYPE, Sticker};

/// Name shown in replies.
pub const BOT_NAME: &str = "Parley";

/// Descriptors of every built-in command, in help-listing order.
#[must_use]
pub fn descriptors() -> Vec<CommandDescriptor> {
    vec![
        menu::descriptor(),
        ping::descriptor(),
        alive::descriptor(),
        info::descriptor(),
        sticker::descriptor(),
    ]
}

/// Builds a registry holding the built-in commands.
///
/// # Errors
///
/// Returns [`RegistryError`] if two built-ins claim the same name.
pub fn registry() -> Result<CommandRegistry, RegistryError> {
    let mut registry = CommandRegistry::new();
    for descriptor in descriptors() {
        registry.register(descriptor)?;
    }
    Ok(registry)
}

/// Renders a duration as `1h 2m 3s`.
#[must_use]
pub fn format_uptime(uptime: Duration) -> String {
    let total = uptime.as_secs();
    let hours = total.div_euclid(3600);
    let minutes = total.rem_euclid(3600).div_euclid(60);
    let seconds = total.rem_euclid(60);
    format!("{hours}h {minutes}m {seconds}s")
}

//! Pairing-code requests for unregistered sessions.

use crate::protocol::{Link, PairingError};

/// Width of each group in a displayed pairing code.
const GROUP_WIDTH: usize = 4;

/// Formats a raw pairing code as upper-case groups joined by dashes, for
/// example `ABCD-EFGH`.
#[must_use]
pub fn format_pairing_code(raw: &str) -> String {
    let symbols: Vec<char> = raw
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|symbol| symbol.to_ascii_uppercase())
        .collect();
    symbols
        .chunks(GROUP_WIDTH)
        .map(|group| group.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join("-")
}

/// Ensures at most one pairing request per connection attempt.
#[derive(Debug, Default)]
pub(crate) struct PairingGate {
    requested: bool,
}

impl PairingGate {
    /// Requests a pairing code unless one was already requested during this
    /// attempt or the link is already registered.
    ///
    /// Returns `None` when no request was made.
    pub(crate) fn request(
        &mut self,
        link: &dyn Link,
        address: Option<&str>,
    ) -> Option<Result<String, PairingError>> {
        if self.requested || link.is_registered() {
            return None;
        }
        self.requested = true;
        let Some(address) = address else {
            return Some(Err(PairingError::MissingAddress));
        };
        Some(
            link.request_pairing_code(address)
                .map(|code| format_pairing_code(&code)),
        )
    }
}

//! Inbound message model.
//!
//! The protocol layer translates each received message into an
//! [`InboundMessage`]: who sent it, where replies go, and a list of tagged
//! content parts. Commands never see protocol-specific structures.

use std::fmt;

/// Opaque protocol address of a user or chat.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address(String);

impl Address {
    /// Wraps a protocol address.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the address as text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Address {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Kind of an attached media item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    /// Still image.
    Image,
    /// Video clip.
    Video,
    /// Audio clip or voice note.
    Audio,
    /// Arbitrary file.
    Document,
    /// Sticker.
    Sticker,
}

/// Downloaded media item with its optional caption.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaMessage {
    /// Media kind.
    pub kind: MediaKind,
    /// MIME type reported by the sender.
    pub mime_type: String,
    /// Raw media bytes.
    pub data: Vec<u8>,
    /// Caption typed alongside the media.
    pub caption: Option<String>,
}

impl MediaMessage {
    /// Builds an image part.
    #[must_use]
    pub fn image(mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            kind: MediaKind::Image,
            mime_type: mime_type.into(),
            data,
            caption: None,
        }
    }

    /// Attaches a caption.
    #[must_use]
    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }
}

/// One tagged content part of a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageContent {
    /// Plain text message.
    Conversation(String),
    /// Text carrying formatting, links or a quote.
    ExtendedText(String),
    /// Attached media.
    Media(MediaMessage),
    /// Identifier of a tapped quick-reply button.
    ButtonReply(String),
    /// Identifier of a selected list row.
    ListReply(String),
}

/// Message that the current one replies to.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QuotedMessage {
    /// Content of the quoted message.
    pub parts: Vec<MessageContent>,
}

/// A received message as seen by the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    /// Author of the message.
    pub sender: Address,
    /// Display name chosen by the author.
    pub sender_name: Option<String>,
    /// Chat that replies are routed to.
    pub chat: Address,
    /// Content parts in protocol order.
    pub parts: Vec<MessageContent>,
    /// Quoted message, when replying.
    pub quoted: Option<QuotedMessage>,
}

impl InboundMessage {
    /// Builds a plain text message sent directly by `sender`.
    #[must_use]
    pub fn text(sender: impl Into<Address>, body: impl Into<String>) -> Self {
        let sender = sender.into();
        Self {
            chat: sender.clone(),
            sender,
            sender_name: None,
            parts: vec![MessageContent::Conversation(body.into())],
            quoted: None,
        }
    }

    /// Builds a message from explicit parts.
    #[must_use]
    pub fn from_parts(sender: Address, chat: Address, parts: Vec<MessageContent>) -> Self {
        Self {
            sender,
            sender_name: None,
            chat,
            parts,
            quoted: None,
        }
    }

    /// Sets the sender's display name.
    #[must_use]
    pub fn with_sender_name(mut self, name: impl Into<String>) -> Self {
        self.sender_name = Some(name.into());
        self
    }

    /// Sets the quoted message.
    #[must_use]
    pub fn with_quoted(mut self, quoted: QuotedMessage) -> Self {
        self.quoted = Some(quoted);
        self
    }

    /// Extracts the command-bearing text.
    ///
    /// Plain text wins over extended text, which wins over a media caption,
    /// which wins over a button or list selection. Blank candidates are
    /// skipped.
    #[must_use]
    pub fn text_body(&self) -> Option<&str> {
        let conversation = self.parts.iter().find_map(|part| match part {
            MessageContent::Conversation(text) => Some(text.as_str()),
            _ => None,
        });
        let extended = self.parts.iter().find_map(|part| match part {
            MessageContent::ExtendedText(text) => Some(text.as_str()),
            _ => None,
        });
        let caption = self.parts.iter().find_map(|part| match part {
            MessageContent::Media(media) => media.caption.as_deref(),
            _ => None,
        });
        let selection = self.parts.iter().find_map(|part| match part {
            MessageContent::ButtonReply(id) | MessageContent::ListReply(id) => Some(id.as_str()),
            _ => None,
        });

        [conversation, extended, caption, selection]
            .into_iter()
            .flatten()
            .find(|text| !text.trim().is_empty())
    }

    /// Image attached to this message, or failing that to the quoted one.
    #[must_use]
    pub fn image(&self) -> Option<&MediaMessage> {
        find_image(&self.parts).or_else(|| {
            self.quoted
                .as_ref()
                .and_then(|quoted| find_image(&quoted.parts))
        })
    }

    /// Display name, falling back to the sender address.
    #[must_use]
    pub fn sender_label(&self) -> &str {
        self.sender_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| self.sender.as_str())
    }
}

fn find_image(parts: &[MessageContent]) -> Option<&MediaMessage> {
    parts.iter().find_map(|part| match part {
        MessageContent::Media(media) if media.kind == MediaKind::Image => Some(media),
        _ => None,
    })
}

#[cfg(test)]
mod tests;

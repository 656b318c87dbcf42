//! Unit tests for the message model.

use rstest::rstest;

use super::*;

fn message(parts: Vec<MessageContent>) -> InboundMessage {
    InboundMessage::from_parts(Address::new("alice"), Address::new("room"), parts)
}

fn captioned(caption: &str) -> MessageContent {
    MessageContent::Media(MediaMessage::image("image/jpeg", vec![1, 2, 3]).with_caption(caption))
}

#[rstest]
#[case::conversation_first(
    vec![
        MessageContent::ListReply("list".into()),
        captioned("caption"),
        MessageContent::ExtendedText("extended".into()),
        MessageContent::Conversation("plain".into()),
    ],
    Some("plain")
)]
#[case::extended_before_caption(
    vec![captioned("caption"), MessageContent::ExtendedText("extended".into())],
    Some("extended")
)]
#[case::caption_before_selection(
    vec![MessageContent::ButtonReply("button".into()), captioned("caption")],
    Some("caption")
)]
#[case::button_selection(vec![MessageContent::ButtonReply(".menu".into())], Some(".menu"))]
#[case::list_selection(vec![MessageContent::ListReply(".ping".into())], Some(".ping"))]
#[case::blank_is_skipped(
    vec![MessageContent::Conversation("   ".into()), MessageContent::ExtendedText("x".into())],
    Some("x")
)]
#[case::nothing(vec![], None)]
fn text_body_follows_precedence(
    #[case] parts: Vec<MessageContent>,
    #[case] expected: Option<&str>,
) {
    assert_eq!(message(parts).text_body(), expected);
}

#[test]
fn image_prefers_attachment_over_quote() {
    let attached = MediaMessage::image("image/png", vec![1]);
    let quoted = MediaMessage::image("image/png", vec![2]);
    let msg = message(vec![MessageContent::Media(attached.clone())]).with_quoted(QuotedMessage {
        parts: vec![MessageContent::Media(quoted)],
    });
    assert_eq!(msg.image(), Some(&attached));
}

#[test]
fn image_falls_back_to_quoted_message() {
    let quoted = MediaMessage::image("image/png", vec![2]);
    let msg = message(vec![MessageContent::ExtendedText(".s".into())]).with_quoted(QuotedMessage {
        parts: vec![MessageContent::Media(quoted.clone())],
    });
    assert_eq!(msg.image(), Some(&quoted));
}

#[test]
fn non_image_media_is_not_an_image() {
    let video = MediaMessage {
        kind: MediaKind::Video,
        mime_type: "video/mp4".into(),
        data: vec![],
        caption: None,
    };
    assert!(message(vec![MessageContent::Media(video)]).image().is_none());
}

#[rstest]
#[case(None, "alice")]
#[case(Some(" "), "alice")]
#[case(Some("Alice"), "Alice")]
fn sender_label_falls_back_to_address(#[case] name: Option<&str>, #[case] expected: &str) {
    let mut msg = InboundMessage::text("alice", "hi");
    msg.sender_name = name.map(str::to_owned);
    assert_eq!(msg.sender_label(), expected);
}

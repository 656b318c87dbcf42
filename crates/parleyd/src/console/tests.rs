//! Unit tests for the console connector.

use std::io::{Cursor, Write};
use std::sync::mpsc::Receiver;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rstest::rstest;
use tempfile::TempDir;

use super::*;

#[derive(Clone, Default)]
struct SharedSink(Arc<Mutex<Vec<u8>>>);

impl SharedSink {
    fn contents(&self) -> String {
        String::from_utf8(self.0.lock().expect("sink lock").clone()).expect("utf-8 output")
    }
}

impl Write for SharedSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().expect("sink lock").write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn connect(dir: &Path, input: &str, sink: &SharedSink) -> (ConsoleConnector, Connection) {
    let connector = ConsoleConnector::new(dir, Cursor::new(input.to_owned()), sink.clone());
    let options = ConnectOptions {
        session_dir: dir.to_path_buf(),
        attempt: 1,
    };
    let connection = connector.connect(&options).expect("connect");
    (connector, connection)
}

fn drain(events: &Receiver<ProtocolEvent>) -> Vec<ProtocolEvent> {
    let mut collected = Vec::new();
    while let Ok(event) = events.recv_timeout(Duration::from_secs(5)) {
        let last = matches!(event, ProtocolEvent::Close(_));
        collected.push(event);
        if last {
            break;
        }
    }
    collected
}

#[test]
fn unregistered_session_pairs_then_opens() {
    let temp = TempDir::new().expect("temp dir");
    let sink = SharedSink::default();
    let (_connector, connection) = connect(temp.path(), "", &sink);

    assert!(!connection.link.is_registered());
    let code = connection
        .link
        .request_pairing_code("15550001111")
        .expect("pairing code");
    assert_eq!(code.len(), 8);

    let events = drain(&connection.events);
    assert!(matches!(events.first(), Some(ProtocolEvent::Connecting)));
    assert!(matches!(
        events.get(1),
        Some(ProtocolEvent::CredentialsUpdated(update)) if update.contains(PRIMARY_RECORD)
    ));
    assert!(matches!(events.get(2), Some(ProtocolEvent::Open)));
    assert_eq!(
        events.last(),
        Some(&ProtocolEvent::Close(DisconnectReason::LoggedOut))
    );
}

#[rstest]
#[case::empty_record(false)]
#[case::record_is_a_directory(true)]
fn unusable_credential_record_reads_as_unregistered(#[case] as_directory: bool) {
    let temp = TempDir::new().expect("temp dir");
    let record = temp.path().join(PRIMARY_RECORD);
    if as_directory {
        std::fs::create_dir(&record).expect("record directory");
    } else {
        std::fs::write(&record, b"").expect("empty record");
    }
    let sink = SharedSink::default();
    let (_connector, connection) = connect(temp.path(), "", &sink);

    assert!(!connection.link.is_registered());
}

#[test]
fn lines_become_messages() {
    let temp = TempDir::new().expect("temp dir");
    std::fs::write(temp.path().join(PRIMARY_RECORD), b"{}").expect("seed creds");
    let sink = SharedSink::default();
    let (_connector, connection) = connect(temp.path(), ".ping\n\n  hello  \n", &sink);

    assert!(connection.link.is_registered());
    let messages: Vec<String> = drain(&connection.events)
        .into_iter()
        .filter_map(|event| match event {
            ProtocolEvent::MessageReceived(message) => message.text_body().map(str::to_owned),
            _ => None,
        })
        .collect();
    assert_eq!(messages, [".ping", "hello"]);
}

#[test]
fn payloads_are_written_as_lines() {
    let temp = TempDir::new().expect("temp dir");
    let sink = SharedSink::default();
    let (_connector, connection) = connect(temp.path(), "", &sink);
    let to = Address::new(CONSOLE_CONTACT);

    let first = connection
        .link
        .send(&to, OutboundPayload::text("hi"))
        .expect("send text");
    connection
        .link
        .send(
            &to,
            OutboundPayload::Edit {
                target: first.clone(),
                text: "edited".to_owned(),
            },
        )
        .expect("send edit");
    connection
        .link
        .send(
            &to,
            OutboundPayload::Sticker {
                data: vec![0; 3],
                mime_type: "image/webp".to_owned(),
            },
        )
        .expect("send sticker");

    assert_eq!(
        sink.contents(),
        format!(
            "[console] hi\n[console] (edit {first}) edited\n[console] <sticker image/webp, 3 bytes>\n"
        )
    );
}

#[test]
fn closed_link_refuses_sends() {
    let temp = TempDir::new().expect("temp dir");
    let sink = SharedSink::default();
    let (_connector, connection) = connect(temp.path(), "", &sink);

    connection.link.close();

    let result = connection
        .link
        .send(&Address::new(CONSOLE_CONTACT), OutboundPayload::text("late"));
    assert_eq!(result, Err(DeliveryError::NotConnected));
    assert!(
        connection
            .link
            .send_presence(None, Presence::Available)
            .is_err()
    );
}

#[test]
fn input_is_consumed_by_the_first_connection() {
    let temp = TempDir::new().expect("temp dir");
    let sink = SharedSink::default();
    let (connector, _connection) = connect(temp.path(), "", &sink);
    let options = ConnectOptions {
        session_dir: temp.path().to_path_buf(),
        attempt: 2,
    };

    let error = connector.connect(&options).expect_err("second connect");
    assert!(matches!(error, ConnectError::Transport { .. }));
}

//! Line-oriented stand-in for a real protocol backend.
//!
//! Each line read from the input becomes a [`ProtocolEvent::MessageReceived`]
//! from a single local contact, and every outbound payload is written to the
//! output as one line. Reaching the end of the input closes the connection
//! as [`DisconnectReason::LoggedOut`], which ends the daemon.
//!
//! When the session directory has no credentials the connector behaves like
//! an unpaired device: it reports itself unregistered, hands out a pairing
//! code, and emits a credential update before opening.

use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::{debug, warn};

use parley_commands::{
    Address, DeliveryError, InboundMessage, MessageKey, OutboundPayload, Outbox,
};
use parley_session::{CredentialBundle, PRIMARY_RECORD, SessionStore};

use crate::protocol::{
    ConnectError, ConnectOptions, Connection, Connector, DisconnectReason, Link, PairingError,
    Presence, ProtocolEvent,
};

const CONSOLE_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::console");

/// Address of the local contact typing into the console.
pub const CONSOLE_CONTACT: &str = "console";

type SharedReader = Arc<Mutex<Option<Box<dyn BufRead + Send>>>>;
type SharedWriter = Arc<Mutex<Box<dyn Write + Send>>>;

/// Connector reading messages from a line source and writing replies to a
/// sink.
pub struct ConsoleConnector {
    session_dir: PathBuf,
    input: SharedReader,
    output: SharedWriter,
}

impl ConsoleConnector {
    /// Builds a connector over arbitrary streams.
    pub fn new<R, W>(session_dir: impl Into<PathBuf>, input: R, output: W) -> Self
    where
        R: BufRead + Send + 'static,
        W: Write + Send + 'static,
    {
        Self {
            session_dir: session_dir.into(),
            input: Arc::new(Mutex::new(Some(Box::new(input)))),
            output: Arc::new(Mutex::new(Box::new(output))),
        }
    }

    /// Builds a connector over the process's standard streams.
    #[must_use]
    pub fn stdio(session_dir: &Path) -> Self {
        Self::new(session_dir, BufReader::new(io::stdin()), io::stdout())
    }
}

impl std::fmt::Debug for ConsoleConnector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsoleConnector")
            .field("session_dir", &self.session_dir)
            .finish_non_exhaustive()
    }
}

impl Connector for ConsoleConnector {
    fn connect(&self, options: &ConnectOptions) -> Result<Connection, ConnectError> {
        let input = self
            .input
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .ok_or_else(|| ConnectError::Transport {
                message: "console input already consumed".to_owned(),
            })?;

        let registered = SessionStore::new(options.session_dir.clone()).has_valid_local_session();
        let link = Arc::new(ConsoleLink {
            output: Arc::clone(&self.output),
            registered,
            closed: AtomicBool::new(false),
            next_key: AtomicU64::new(1),
        });
        let (events, receiver) = mpsc::channel();
        let reader_link = Arc::clone(&link);
        thread::Builder::new()
            .name("parley-console".to_owned())
            .spawn(move || pump(input, &events, &reader_link))
            .map_err(|error| ConnectError::Transport {
                message: error.to_string(),
            })?;

        Ok(Connection {
            link,
            events: receiver,
        })
    }
}

fn pump(mut input: Box<dyn BufRead + Send>, events: &Sender<ProtocolEvent>, link: &ConsoleLink) {
    if events.send(ProtocolEvent::Connecting).is_err() {
        return;
    }
    if !link.registered {
        let mut update = CredentialBundle::new();
        let creds = format!("{{\"registered\":true,\"me\":\"{CONSOLE_CONTACT}\"}}");
        if update.insert(PRIMARY_RECORD, creds.into_bytes()).is_ok()
            && events.send(ProtocolEvent::CredentialsUpdated(update)).is_err()
        {
            return;
        }
    }
    if events.send(ProtocolEvent::Open).is_err() {
        return;
    }

    let mut line = String::new();
    loop {
        line.clear();
        match input.read_line(&mut line) {
            Ok(0) => {
                let _ = events.send(ProtocolEvent::Close(DisconnectReason::LoggedOut));
                return;
            }
            Ok(_) => {
                if link.closed.load(Ordering::Acquire) {
                    return;
                }
                let text = line.trim();
                if text.is_empty() {
                    continue;
                }
                let message = InboundMessage::text(CONSOLE_CONTACT, text)
                    .with_sender_name("Console");
                if events.send(ProtocolEvent::MessageReceived(message)).is_err() {
                    return;
                }
            }
            Err(error) => {
                warn!(target: CONSOLE_TARGET, error = %error, "console read failed");
                let _ = events.send(ProtocolEvent::Close(DisconnectReason::ConnectionLost));
                return;
            }
        }
    }
}

struct ConsoleLink {
    output: SharedWriter,
    registered: bool,
    closed: AtomicBool,
    next_key: AtomicU64,
}

impl ConsoleLink {
    fn write_line(&self, line: &str) -> Result<(), DeliveryError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(DeliveryError::NotConnected);
        }
        let mut output = self.output.lock().unwrap_or_else(PoisonError::into_inner);
        writeln!(output, "{line}")
            .and_then(|()| output.flush())
            .map_err(|error| DeliveryError::Rejected {
                to: Address::new(CONSOLE_CONTACT),
                message: error.to_string(),
            })
    }
}

impl Outbox for ConsoleLink {
    fn send(&self, to: &Address, payload: OutboundPayload) -> Result<MessageKey, DeliveryError> {
        let key = MessageKey::new(format!(
            "console-{}",
            self.next_key.fetch_add(1, Ordering::Relaxed)
        ));
        let line = match payload {
            OutboundPayload::Text(text) => format!("[{to}] {text}"),
            OutboundPayload::Sticker { data, mime_type } => {
                format!("[{to}] <sticker {mime_type}, {} bytes>", data.len())
            }
            OutboundPayload::Edit { target, text } => format!("[{to}] (edit {target}) {text}"),
        };
        self.write_line(&line)?;
        Ok(key)
    }
}

impl Link for ConsoleLink {
    fn is_registered(&self) -> bool {
        self.registered
    }

    fn request_pairing_code(&self, address: &str) -> Result<String, PairingError> {
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|error| PairingError::Rejected {
                address: address.to_owned(),
                message: error.to_string(),
            })?
            .as_nanos();
        Ok(format!("{:08X}", seed & 0xFFFF_FFFF))
    }

    fn send_presence(&self, to: Option<&Address>, presence: Presence) -> Result<(), DeliveryError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(DeliveryError::NotConnected);
        }
        debug!(target: CONSOLE_TARGET, to = ?to, presence = ?presence, "presence");
        Ok(())
    }

    fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }
}

#[cfg(test)]
mod tests;

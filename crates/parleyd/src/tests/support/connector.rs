//! Scripted protocol connector.
//!
//! Each call to [`Connector::connect`] consumes the next [`Script`]. A
//! running script emits its events from a background thread, so the
//! supervisor sees them exactly as it would from a live protocol stack.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use parley_commands::{Address, DeliveryError, MessageKey, OutboundPayload, Outbox};

use crate::protocol::{
    ConnectError, ConnectOptions, Connection, Connector, Link, PairingError, Presence,
    ProtocolEvent,
};

const HOLD_POLL: Duration = Duration::from_millis(5);

/// One action performed by a running script.
#[derive(Debug, Clone)]
pub enum Step {
    /// Deliver an event to the supervisor.
    Emit(ProtocolEvent),
    /// Sleep before the next step.
    Pause(Duration),
    /// Block until the supervisor closes the link.
    HoldUntilClosed,
}

/// Behaviour of a single connection attempt.
#[derive(Debug, Clone)]
pub enum Script {
    /// `connect` fails with a transport error.
    Refuse(String),
    /// `connect` succeeds and the steps run in order.
    Run(Vec<Step>),
}

impl Script {
    /// Builds a script that only emits events.
    #[must_use]
    pub fn events(events: impl IntoIterator<Item = ProtocolEvent>) -> Self {
        Self::Run(events.into_iter().map(Step::Emit).collect())
    }
}

/// Connector replaying queued scripts and recording every link it hands out.
#[derive(Debug)]
pub struct ScriptedConnector {
    registered: AtomicBool,
    pairing_code: String,
    scripts: Mutex<VecDeque<Script>>,
    options: Mutex<Vec<ConnectOptions>>,
    links: Mutex<Vec<Arc<ScriptedLink>>>,
}

impl ScriptedConnector {
    /// Builds a connector whose links report a registered session.
    #[must_use]
    pub fn new(scripts: impl IntoIterator<Item = Script>) -> Self {
        Self {
            registered: AtomicBool::new(true),
            pairing_code: "abcd1234".to_owned(),
            scripts: Mutex::new(scripts.into_iter().collect()),
            options: Mutex::new(Vec::new()),
            links: Mutex::new(Vec::new()),
        }
    }

    /// Makes later links report an unregistered session.
    pub fn set_registered(&self, registered: bool) {
        self.registered.store(registered, Ordering::SeqCst);
    }

    /// Queues another script.
    pub fn push(&self, script: Script) {
        self.scripts
            .lock()
            .expect("script queue poisoned")
            .push_back(script);
    }

    /// Number of `connect` calls so far.
    #[must_use]
    pub fn dials(&self) -> usize {
        self.options.lock().expect("options poisoned").len()
    }

    /// Attempt numbers passed to each `connect` call.
    #[must_use]
    pub fn attempts(&self) -> Vec<u32> {
        self.options
            .lock()
            .expect("options poisoned")
            .iter()
            .map(|options| options.attempt)
            .collect()
    }

    /// Links handed out by successful connects.
    #[must_use]
    pub fn links(&self) -> Vec<Arc<ScriptedLink>> {
        self.links.lock().expect("links poisoned").clone()
    }
}

impl Connector for ScriptedConnector {
    fn connect(&self, options: &ConnectOptions) -> Result<Connection, ConnectError> {
        self.options
            .lock()
            .expect("options poisoned")
            .push(options.clone());
        let script = self
            .scripts
            .lock()
            .expect("script queue poisoned")
            .pop_front()
            .unwrap_or_else(|| Script::Refuse("script exhausted".to_owned()));
        let steps = match script {
            Script::Refuse(message) => return Err(ConnectError::Transport { message }),
            Script::Run(steps) => steps,
        };

        let link = Arc::new(ScriptedLink::new(
            self.registered.load(Ordering::SeqCst),
            &self.pairing_code,
        ));
        self.links
            .lock()
            .expect("links poisoned")
            .push(Arc::clone(&link));
        let (events, receiver) = mpsc::channel();
        let runner = Arc::clone(&link);
        thread::spawn(move || play(steps, &events, &runner));
        Ok(Connection {
            link,
            events: receiver,
        })
    }
}

fn play(steps: Vec<Step>, events: &Sender<ProtocolEvent>, link: &ScriptedLink) {
    for step in steps {
        match step {
            Step::Emit(event) => {
                if events.send(event).is_err() {
                    return;
                }
            }
            Step::Pause(duration) => thread::sleep(duration),
            Step::HoldUntilClosed => {
                while !link.is_closed() {
                    thread::sleep(HOLD_POLL);
                }
            }
        }
    }
}

/// Link that records everything the supervisor asks of it.
#[derive(Debug)]
pub struct ScriptedLink {
    registered: bool,
    pairing_code: String,
    closed: AtomicBool,
    presence: AtomicUsize,
    pairing_requests: Mutex<Vec<String>>,
    sent: Mutex<Vec<(Address, OutboundPayload)>>,
}

impl ScriptedLink {
    fn new(registered: bool, pairing_code: &str) -> Self {
        Self {
            registered,
            pairing_code: pairing_code.to_owned(),
            closed: AtomicBool::new(false),
            presence: AtomicUsize::new(0),
            pairing_requests: Mutex::new(Vec::new()),
            sent: Mutex::new(Vec::new()),
        }
    }

    /// Whether the supervisor closed the link.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Presence updates received so far.
    #[must_use]
    pub fn presence_updates(&self) -> usize {
        self.presence.load(Ordering::SeqCst)
    }

    /// Addresses passed to pairing requests.
    #[must_use]
    pub fn pairing_requests(&self) -> Vec<String> {
        self.pairing_requests
            .lock()
            .expect("pairing log poisoned")
            .clone()
    }

    /// Payloads sent through the link.
    #[must_use]
    pub fn sent(&self) -> Vec<(Address, OutboundPayload)> {
        self.sent.lock().expect("send log poisoned").clone()
    }
}

impl Outbox for ScriptedLink {
    fn send(&self, to: &Address, payload: OutboundPayload) -> Result<MessageKey, DeliveryError> {
        if self.is_closed() {
            return Err(DeliveryError::NotConnected);
        }
        let mut sent = self.sent.lock().expect("send log poisoned");
        sent.push((to.clone(), payload));
        Ok(MessageKey::new(format!("scripted-{}", sent.len())))
    }
}

impl Link for ScriptedLink {
    fn is_registered(&self) -> bool {
        self.registered
    }

    fn request_pairing_code(&self, address: &str) -> Result<String, PairingError> {
        self.pairing_requests
            .lock()
            .expect("pairing log poisoned")
            .push(address.to_owned());
        Ok(self.pairing_code.clone())
    }

    fn send_presence(&self, _to: Option<&Address>, _presence: Presence) -> Result<(), DeliveryError> {
        if self.is_closed() {
            return Err(DeliveryError::NotConnected);
        }
        self.presence.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

//! Crate-level test doubles and behaviour tests.

use std::sync::Mutex;

use crate::message::Address;
use crate::outbox::{DeliveryError, MessageKey, OutboundPayload, Outbox};


/// Outbox that records every payload and hands out sequential keys.
#[derive(Debug, Default)]
pub(crate) struct RecordingOutbox {
    sent: Mutex<Vec<(Address, OutboundPayload)>>,
}

impl RecordingOutbox {
    pub(crate) fn sent(&self) -> Vec<(Address, OutboundPayload)> {
        self.sent.lock().expect("outbox lock").clone()
    }

    pub(crate) fn payloads(&self) -> Vec<OutboundPayload> {
        self.sent().into_iter().map(|(_, payload)| payload).collect()
    }
}

impl Outbox for RecordingOutbox {
    fn send(&self, to: &Address, payload: OutboundPayload) -> Result<MessageKey, DeliveryError> {
        let mut sent = self.sent.lock().expect("outbox lock");
        sent.push((to.clone(), payload));
        Ok(MessageKey::new(format!("msg-{}", sent.len())))
    }
}

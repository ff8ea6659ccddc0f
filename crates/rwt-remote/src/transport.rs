//! The seam between the dispatcher and whatever carries messages to the
//! server.

use std::collections::VecDeque;

use serde_json::Value;

use crate::codec::message_to_json;
use crate::error::TransportError;
use crate::message::Message;

/// Carries a built message to the server.
///
/// Returning `Ok` means the message was accepted and its changes may be
/// forgotten; returning `Err` makes the dispatcher keep them pending.
pub trait Transport {
    fn transmit(&mut self, message: &Message) -> Result<(), TransportError>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn transmit(&mut self, message: &Message) -> Result<(), TransportError> {
        (**self).transmit(message)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn transmit(&mut self, message: &Message) -> Result<(), TransportError> {
        (**self).transmit(message)
    }
}

/// In-memory transport that records every accepted message.
///
/// Failures can be scripted with [`fail_next`](Self::fail_next); a failed
/// transmission is not recorded.
#[derive(Debug, Default)]
pub struct MemoryTransport {
    sent: Vec<Message>,
    failures: VecDeque<TransportError>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next transmission fail with `error`.
    pub fn fail_next(&mut self, error: TransportError) {
        self.failures.push_back(error);
    }

    pub fn sent(&self) -> &[Message] {
        &self.sent
    }

    pub fn requests_sent(&self) -> usize {
        self.sent.len()
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.sent.last()
    }

    /// Wire form of the last accepted message.
    pub fn last_json(&self) -> Option<Value> {
        self.last_message().map(message_to_json)
    }

    pub fn clear_log(&mut self) {
        self.sent.clear();
    }
}

impl Transport for MemoryTransport {
    fn transmit(&mut self, message: &Message) -> Result<(), TransportError> {
        if let Some(error) = self.failures.pop_front() {
            return Err(error);
        }
        self.sent.push(message.clone());
        Ok(())
    }
}

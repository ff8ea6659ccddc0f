//! Message assembly from a set of pending changes.

use log::debug;

use crate::message::Message;
use crate::operation::Operation;
use crate::store::PendingChanges;

/// Turns pending changes into a [`Message`].
///
/// Building is a pure function of its input: queued events first, each as a
/// `notify` carrying the parameters of its event type, then one `set` per
/// dirty target in first-touched order. A target that has both an event
/// and property writes gets two operations.
#[derive(Debug, Default, Clone, Copy)]
pub struct MessageBuilder;

impl MessageBuilder {
    pub fn new() -> Self {
        Self
    }

    pub fn build(&self, changes: &PendingChanges, request_counter: u64) -> Message {
        let mut operations = Vec::with_capacity(changes.event_count() + changes.target_count());
        for event in changes.events() {
            operations.push(Operation::Notify {
                target: event.target.clone(),
                event: event.event_type.clone(),
                properties: changes
                    .parameters(&event.event_type)
                    .cloned()
                    .unwrap_or_default(),
            });
        }
        for (target, properties) in changes.properties() {
            operations.push(Operation::Set {
                target: target.to_string(),
                properties: properties.clone(),
            });
        }
        debug!(
            "built request {request_counter} with {} operation(s)",
            operations.len()
        );
        Message::new(request_counter, operations)
    }
}

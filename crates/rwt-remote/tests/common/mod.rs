#![allow(dead_code)]

use rwt_remote::{ChangeDispatcher, MemoryTransport, Message, Operation};
use serde_json::{json, Value};

pub const WIDGET_SELECTED: &str = "org.eclipse.swt.events.widgetSelected";

pub fn new_dispatcher() -> ChangeDispatcher<MemoryTransport> {
    ChangeDispatcher::new(MemoryTransport::new())
}

/// The last message the transport accepted.
pub fn last_message(dispatcher: &ChangeDispatcher<MemoryTransport>) -> &Message {
    dispatcher
        .transport()
        .last_message()
        .expect("a message should have been sent")
}

/// `[type, target, properties]` triples, for compact shape assertions.
pub fn shape(message: &Message) -> Vec<(String, String, Value)> {
    message
        .operations()
        .iter()
        .map(|op: &Operation| {
            (
                op.op_type().as_str().to_string(),
                op.target().to_string(),
                json!(op.properties()),
            )
        })
        .collect()
}

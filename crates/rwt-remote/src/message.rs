//! The outgoing protocol message: ordered operations plus request metadata.

use serde_json::Value;

use crate::operation::{Operation, OperationType};

/// Per-request metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageMeta {
    pub request_counter: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub meta: MessageMeta,
    pub operations: Vec<Operation>,
}

impl Message {
    pub fn new(request_counter: u64, operations: Vec<Operation>) -> Self {
        Self {
            meta: MessageMeta { request_counter },
            operations,
        }
    }

    pub fn request_counter(&self) -> u64 {
        self.meta.request_counter
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    pub fn operation_count(&self) -> usize {
        self.operations.len()
    }

    pub fn operation(&self, index: usize) -> Option<&Operation> {
        self.operations.get(index)
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// First `set` operation for `target` that carries `property`.
    pub fn find_set_operation(&self, target: &str, property: &str) -> Option<&Operation> {
        self.find(OperationType::Set, target, |op| {
            op.properties().contains_key(property)
        })
    }

    /// Value of `property` as written by a `set` operation for `target`.
    pub fn find_set_property(&self, target: &str, property: &str) -> Option<&Value> {
        self.find_set_operation(target, property)
            .and_then(|op| op.property(property))
    }

    pub fn find_notify_operation(&self, target: &str, event: &str) -> Option<&Operation> {
        self.find(OperationType::Notify, target, |op| op.event() == Some(event))
    }

    pub fn find_create_operation(&self, target: &str) -> Option<&Operation> {
        self.find(OperationType::Create, target, |_| true)
    }

    pub fn find_call_operation(&self, target: &str, method: &str) -> Option<&Operation> {
        self.find(OperationType::Call, target, |op| {
            matches!(op, Operation::Call { method: m, .. } if m == method)
        })
    }

    fn find(
        &self,
        op_type: OperationType,
        target: &str,
        predicate: impl Fn(&Operation) -> bool,
    ) -> Option<&Operation> {
        self.operations
            .iter()
            .find(|op| op.op_type() == op_type && op.target() == target && predicate(*op))
    }
}

//! Protocol operations, the atomic units of an outgoing message.

use serde_json::{Map, Value};

use crate::error::CodecError;

/// Property bag carried by an operation. Key order is insertion order.
pub type Properties = Map<String, Value>;

// ── Operation type ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationType {
    Set,
    Notify,
    Create,
    Destroy,
    Call,
}

impl OperationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationType::Set => "set",
            OperationType::Notify => "notify",
            OperationType::Create => "create",
            OperationType::Destroy => "destroy",
            OperationType::Call => "call",
        }
    }

    pub fn from_str(s: &str) -> Result<Self, CodecError> {
        match s {
            "set" => Ok(OperationType::Set),
            "notify" => Ok(OperationType::Notify),
            "create" => Ok(OperationType::Create),
            "destroy" => Ok(OperationType::Destroy),
            "call" => Ok(OperationType::Call),
            other => Err(CodecError::UnknownOperationType(other.to_string())),
        }
    }
}

impl std::fmt::Display for OperationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Operation ─────────────────────────────────────────────────────────────

/// A single protocol operation addressed to one target.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    Set {
        target: String,
        properties: Properties,
    },
    Notify {
        target: String,
        event: String,
        properties: Properties,
    },
    Create {
        target: String,
        widget_type: String,
        properties: Properties,
    },
    Destroy {
        target: String,
    },
    Call {
        target: String,
        method: String,
        properties: Properties,
    },
}

static NO_PROPERTIES: std::sync::OnceLock<Properties> = std::sync::OnceLock::new();

impl Operation {
    pub fn op_type(&self) -> OperationType {
        match self {
            Operation::Set { .. } => OperationType::Set,
            Operation::Notify { .. } => OperationType::Notify,
            Operation::Create { .. } => OperationType::Create,
            Operation::Destroy { .. } => OperationType::Destroy,
            Operation::Call { .. } => OperationType::Call,
        }
    }

    pub fn target(&self) -> &str {
        match self {
            Operation::Set { target, .. }
            | Operation::Notify { target, .. }
            | Operation::Create { target, .. }
            | Operation::Destroy { target }
            | Operation::Call { target, .. } => target,
        }
    }

    /// Properties of the operation. `destroy` carries none and yields an
    /// empty map.
    pub fn properties(&self) -> &Properties {
        match self {
            Operation::Set { properties, .. }
            | Operation::Notify { properties, .. }
            | Operation::Create { properties, .. }
            | Operation::Call { properties, .. } => properties,
            Operation::Destroy { .. } => NO_PROPERTIES.get_or_init(Map::new),
        }
    }

    pub fn property(&self, name: &str) -> Option<&Value> {
        self.properties().get(name)
    }

    /// Event type of a `notify` operation.
    pub fn event(&self) -> Option<&str> {
        match self {
            Operation::Notify { event, .. } => Some(event),
            _ => None,
        }
    }
}

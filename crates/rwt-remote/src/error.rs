//! Error types for the dispatcher, the transport seam, and the JSON codec.

use thiserror::Error;

// ── Transport ─────────────────────────────────────────────────────────────

/// Failure reported by a [`Transport`](crate::transport::Transport).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("transport rejected request {request_counter}: {reason}")]
    Rejected { request_counter: u64, reason: String },
    #[error("transport unavailable: {0}")]
    Unavailable(String),
}

// ── Dispatcher ────────────────────────────────────────────────────────────

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("malformed parameter name: {0:?}")]
    MalformedParameterName(String),
    #[error("target id must not be empty")]
    EmptyTarget,
    #[error("name must not be empty")]
    EmptyName,
    #[error("request {0} is still in flight")]
    FlushInFlight(u64),
    #[error("request counter {0} cannot advance")]
    CounterExhausted(u64),
    #[error("no flush in flight for request {0}")]
    UnknownFlush(u64),
    #[error("transport failure: {0}")]
    Transport(#[from] TransportError),
}

// ── Codec ─────────────────────────────────────────────────────────────────

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("message must be an object")]
    NotAnObject,
    #[error("missing field: {0}")]
    MissingField(&'static str),
    #[error("field {0} has the wrong type")]
    InvalidField(&'static str),
    #[error("unknown operation type: {0}")]
    UnknownOperationType(String),
    #[error("invalid JSON: {0}")]
    Json(String),
}

impl From<serde_json::Error> for CodecError {
    fn from(err: serde_json::Error) -> Self {
        CodecError::Json(err.to_string())
    }
}

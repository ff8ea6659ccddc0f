//! Client-side change accumulation for the RWT remoting protocol.
//!
//! Widgets report property writes and user events to a [`ChangeDispatcher`].
//! The dispatcher keeps them in a [`PendingChangeStore`] and, on
//! [`send`](ChangeDispatcher::send), turns everything pending into one
//! [`Message`]: a `notify` operation per queued event followed by a `set`
//! operation per changed target, tagged with a request counter that grows
//! by one per completed request.
//!
//! # Example
//!
//! ```
//! use rwt_remote::{ChangeDispatcher, MemoryTransport, OperationType};
//!
//! let mut dispatcher = ChangeDispatcher::new(MemoryTransport::new());
//! dispatcher.add_event("org.eclipse.swt.events.widgetSelected", "w3").unwrap();
//! dispatcher
//!     .add_event_parameter("org.eclipse.swt.events.widgetSelected", "text", "foo")
//!     .unwrap();
//! dispatcher.set_property("w3", "myProp", 42).unwrap();
//!
//! let message = dispatcher.send().unwrap();
//! assert_eq!(message.operation_count(), 2);
//! assert_eq!(message.operation(0).unwrap().op_type(), OperationType::Notify);
//! assert_eq!(message.operation(1).unwrap().op_type(), OperationType::Set);
//!
//! // Nothing changed since: the next request is empty.
//! assert_eq!(dispatcher.send().unwrap().operation_count(), 0);
//! assert_eq!(dispatcher.requests_sent_count(), 2);
//! ```

pub mod adapter;
pub mod builder;
pub mod codec;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod message;
pub mod operation;
pub mod store;
pub mod transport;

pub use adapter::RemoteAdapter;
pub use builder::MessageBuilder;
pub use codec::{
    message_from_json, message_from_str, message_to_json, message_to_string, operation_from_json,
    operation_to_json,
};
pub use config::{DispatcherConfig, DEFAULT_EVENT_TYPES};
pub use dispatcher::{ChangeDispatcher, DispatcherState, InFlightFlush};
pub use error::{CodecError, DispatchError, TransportError};
pub use message::{Message, MessageMeta};
pub use operation::{Operation, OperationType, Properties};
pub use store::{qualified_parameter_name, PendingChangeStore, PendingChanges, PendingEvent};
pub use transport::{MemoryTransport, Transport};

/// Returns the crate version at compile time.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

//! The client-side request dispatcher.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use log::{debug, trace, warn};
use serde_json::Value;

use crate::builder::MessageBuilder;
use crate::config::DispatcherConfig;
use crate::error::DispatchError;
use crate::message::Message;
use crate::store::{PendingChangeStore, PendingChanges, PARAMETER_SEPARATOR};
use crate::transport::Transport;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatcherState {
    /// Nothing pending, nothing in flight.
    Idle,
    /// Changes are pending and no flush is in flight.
    Accumulating,
    /// A flush has been started and not yet completed or failed.
    Flushing,
}

/// A flush started with [`ChangeDispatcher::begin_flush`].
///
/// Owns the snapshot of the changes it carries. Hand it back to
/// [`complete_flush`](ChangeDispatcher::complete_flush) once the transport
/// acknowledged the message, or to
/// [`fail_flush`](ChangeDispatcher::fail_flush) to put the changes back.
#[derive(Debug)]
#[must_use = "an in-flight flush must be completed or failed"]
pub struct InFlightFlush {
    dispatcher: u64,
    next_counter: u64,
    message: Message,
    changes: PendingChanges,
}

impl InFlightFlush {
    pub fn message(&self) -> &Message {
        &self.message
    }

    pub fn request_counter(&self) -> u64 {
        self.message.request_counter()
    }
}

type SendListener = Box<dyn FnMut(&Message)>;

static NEXT_DISPATCHER_ID: AtomicU64 = AtomicU64::new(0);

/// Accepts property writes and events from the widget layer and flushes
/// them to the server as one message per request.
///
/// Within a cycle writes are coalesced per `(target, property)`; the
/// dispatcher does not compare against values sent in earlier requests
/// (see [`RemoteAdapter`](crate::RemoteAdapter) for that).
pub struct ChangeDispatcher<T: Transport> {
    id: u64,
    config: DispatcherConfig,
    store: PendingChangeStore,
    builder: MessageBuilder,
    transport: T,
    request_counter: u64,
    in_flight: Option<u64>,
    requests_sent: usize,
    next_listener_id: u64,
    listeners: BTreeMap<u64, SendListener>,
}

impl<T: Transport> ChangeDispatcher<T> {
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, DispatcherConfig::default())
    }

    pub fn with_config(transport: T, config: DispatcherConfig) -> Self {
        Self {
            id: NEXT_DISPATCHER_ID.fetch_add(1, Ordering::Relaxed),
            request_counter: config.initial_request_counter,
            config,
            store: PendingChangeStore::new(),
            builder: MessageBuilder::new(),
            transport,
            in_flight: None,
            requests_sent: 0,
            next_listener_id: 0,
            listeners: BTreeMap::new(),
        }
    }

    // ── Accumulation ──────────────────────────────────────────────────────

    pub fn set_property(
        &mut self,
        target: &str,
        name: &str,
        value: impl Into<Value>,
    ) -> Result<(), DispatchError> {
        check_target(target)?;
        check_name(name)?;
        self.store.set_property(target, name, value.into());
        Ok(())
    }

    /// Queues an event for `target`. Queuing the same pair twice within a
    /// cycle has no further effect.
    pub fn add_event(&mut self, event_type: &str, target: &str) -> Result<(), DispatchError> {
        check_name(event_type)?;
        check_target(target)?;
        self.store.add_event(event_type, target);
        Ok(())
    }

    pub fn add_event_parameter(
        &mut self,
        event_type: &str,
        param: &str,
        value: impl Into<Value>,
    ) -> Result<(), DispatchError> {
        check_name(event_type)?;
        check_name(param)?;
        self.store.add_event_parameter(event_type, param, value.into());
        Ok(())
    }

    /// Name-routed entry point.
    ///
    /// `<eventType>.<param>` is routed as an event parameter when
    /// `<eventType>` is a configured event type or one currently queued;
    /// otherwise the name must be exactly `<targetId>.<property>`.
    pub fn add_parameter(&mut self, name: &str, value: impl Into<Value>) -> Result<(), DispatchError> {
        if let Some((event_type, param)) = self.split_event_parameter(name) {
            return self.add_event_parameter(event_type, param, value);
        }
        let mut parts = name.split(PARAMETER_SEPARATOR);
        match (parts.next(), parts.next(), parts.next()) {
            (Some(target), Some(property), None) if !target.is_empty() && !property.is_empty() => {
                self.set_property(target, property, value)
            }
            _ => Err(DispatchError::MalformedParameterName(name.to_string())),
        }
    }

    /// Longest known event type that prefixes `name`, plus the remainder.
    fn split_event_parameter<'n>(&self, name: &'n str) -> Option<(&'n str, &'n str)> {
        let configured = self.config.event_types.iter().map(String::as_str);
        let queued = self.store.queued_events().map(|e| e.event_type.as_str());
        configured
            .chain(queued)
            .filter_map(|event_type| {
                let rest = name.strip_prefix(event_type)?;
                let param = rest.strip_prefix(PARAMETER_SEPARATOR)?;
                (!param.is_empty()).then_some(event_type.len())
            })
            .max()
            .map(|len| (&name[..len], &name[len + 1..]))
    }

    // ── Flushing ──────────────────────────────────────────────────────────

    /// Builds the message for everything pending and transmits it.
    ///
    /// On success the flushed changes are discarded, the request counter
    /// advances and the sent message is returned. On transport failure the
    /// changes are put back and the error is returned.
    pub fn send(&mut self) -> Result<Message, DispatchError> {
        let flight = self.begin_flush()?;
        match self.transport.transmit(flight.message()) {
            Ok(()) => self.complete_flush(flight),
            Err(err) => {
                self.fail_flush(flight)?;
                Err(err.into())
            }
        }
    }

    /// Moves all pending changes into a new in-flight flush. Changes
    /// recorded afterwards accumulate for the next request.
    ///
    /// Fails without touching the pending changes when another flush is in
    /// flight or the request counter cannot advance past this request.
    pub fn begin_flush(&mut self) -> Result<InFlightFlush, DispatchError> {
        if let Some(counter) = self.in_flight {
            return Err(DispatchError::FlushInFlight(counter));
        }
        let next_counter = self
            .request_counter
            .checked_add(1)
            .ok_or(DispatchError::CounterExhausted(self.request_counter))?;
        let changes = self.store.take();
        let message = self.builder.build(&changes, self.request_counter);
        self.in_flight = Some(self.request_counter);
        debug!(
            "flushing request {} ({} event(s), {} target(s))",
            self.request_counter,
            changes.event_count(),
            changes.target_count()
        );
        Ok(InFlightFlush {
            dispatcher: self.id,
            next_counter,
            message,
            changes,
        })
    }

    /// Finishes a flush the transport accepted. Parameters of event types
    /// with no queued event are dropped here.
    pub fn complete_flush(&mut self, flight: InFlightFlush) -> Result<Message, DispatchError> {
        self.check_in_flight(&flight)?;
        self.in_flight = None;
        self.request_counter = flight.next_counter;
        self.requests_sent += 1;
        let InFlightFlush {
            message, changes, ..
        } = flight;
        for event_type in changes.unmatched_parameter_types() {
            warn!(
                "request {} dropped parameters for {event_type}: no such event queued",
                message.request_counter()
            );
        }
        trace!("request {} completed", message.request_counter());
        for listener in self.listeners.values_mut() {
            listener(&message);
        }
        Ok(message)
    }

    /// Abandons a flush the transport could not deliver and merges its
    /// changes back into the store.
    pub fn fail_flush(&mut self, flight: InFlightFlush) -> Result<(), DispatchError> {
        self.check_in_flight(&flight)?;
        self.in_flight = None;
        warn!(
            "request {} failed, restoring {} operation(s)",
            flight.request_counter(),
            flight.message.operation_count()
        );
        self.store.restore(flight.changes);
        Ok(())
    }

    fn check_in_flight(&self, flight: &InFlightFlush) -> Result<(), DispatchError> {
        match self.in_flight {
            Some(counter) if flight.dispatcher == self.id && counter == flight.request_counter() => {
                Ok(())
            }
            _ => Err(DispatchError::UnknownFlush(flight.request_counter())),
        }
    }

    // ── Observation ───────────────────────────────────────────────────────

    /// Registers a listener called with every completed message. Returns an
    /// id for [`remove_send_listener`](Self::remove_send_listener).
    pub fn on_send(&mut self, listener: impl FnMut(&Message) + 'static) -> u64 {
        let id = self.next_listener_id;
        self.next_listener_id += 1;
        self.listeners.insert(id, Box::new(listener));
        id
    }

    pub fn remove_send_listener(&mut self, id: u64) -> bool {
        self.listeners.remove(&id).is_some()
    }

    pub fn state(&self) -> DispatcherState {
        if self.in_flight.is_some() {
            DispatcherState::Flushing
        } else if self.store.has_changes() {
            DispatcherState::Accumulating
        } else {
            DispatcherState::Idle
        }
    }

    pub fn has_changes(&self) -> bool {
        self.store.has_changes()
    }

    /// Counter the next message will carry.
    pub fn request_counter(&self) -> u64 {
        self.request_counter
    }

    /// Number of completed sends.
    pub fn requests_sent_count(&self) -> usize {
        self.requests_sent
    }

    pub fn store(&self) -> &PendingChangeStore {
        &self.store
    }

    pub fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }
}

fn check_target(target: &str) -> Result<(), DispatchError> {
    if target.is_empty() {
        return Err(DispatchError::EmptyTarget);
    }
    Ok(())
}

fn check_name(name: &str) -> Result<(), DispatchError> {
    if name.is_empty() {
        return Err(DispatchError::EmptyName);
    }
    Ok(())
}

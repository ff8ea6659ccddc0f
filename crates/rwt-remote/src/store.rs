//! Pending change accumulation between two flushes.

use indexmap::{IndexMap, IndexSet};
use log::trace;
use serde_json::Value;

use crate::operation::Properties;

/// Separator between an event type and a parameter name in a qualified
/// parameter name (`<eventType>.<paramName>`).
pub const PARAMETER_SEPARATOR: char = '.';

/// Builds the wire-level qualified name of an event parameter.
pub fn qualified_parameter_name(event_type: &str, param: &str) -> String {
    let mut out = String::with_capacity(event_type.len() + param.len() + 1);
    out.push_str(event_type);
    out.push(PARAMETER_SEPARATOR);
    out.push_str(param);
    out
}

/// A queued `(event type, target)` notification.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PendingEvent {
    pub event_type: String,
    pub target: String,
}

/// Owned set of pending changes. This is both the live content of a
/// [`PendingChangeStore`] and the snapshot handed to the message builder
/// when a flush starts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PendingChanges {
    /// target -> (property -> value), targets in first-touched order
    properties: IndexMap<String, Properties>,
    events: IndexSet<PendingEvent>,
    /// event type -> (parameter -> value)
    parameters: IndexMap<String, Properties>,
}

impl PendingChanges {
    /// True when nothing would be emitted for these changes.
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty() && self.events.is_empty()
    }

    pub fn properties(&self) -> impl Iterator<Item = (&str, &Properties)> {
        self.properties.iter().map(|(t, p)| (t.as_str(), p))
    }

    pub fn events(&self) -> impl Iterator<Item = &PendingEvent> {
        self.events.iter()
    }

    /// Parameters queued for `event_type`, if any.
    pub fn parameters(&self, event_type: &str) -> Option<&Properties> {
        self.parameters.get(event_type)
    }

    pub fn property_count(&self) -> usize {
        self.properties.values().map(Properties::len).sum()
    }

    pub fn target_count(&self) -> usize {
        self.properties.len()
    }

    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    /// Event types that have parameters but no queued event. Their
    /// parameters are not emitted.
    pub fn unmatched_parameter_types(&self) -> impl Iterator<Item = &str> {
        self.parameters
            .keys()
            .filter(|event_type| !self.events.iter().any(|e| &e.event_type == *event_type))
            .map(String::as_str)
    }

    /// Merges `newer` on top of `self`. Values from `newer` win, while keys
    /// already present in `self` keep their position.
    fn merge(&mut self, newer: PendingChanges) {
        for (target, props) in newer.properties {
            let entry = self.properties.entry(target).or_default();
            for (name, value) in props {
                entry.insert(name, value);
            }
        }
        self.events.extend(newer.events);
        for (event_type, params) in newer.parameters {
            let entry = self.parameters.entry(event_type).or_default();
            for (name, value) in params {
                entry.insert(name, value);
            }
        }
    }
}

/// Accumulates property writes, events and event parameters for the next
/// flush.
#[derive(Debug, Default)]
pub struct PendingChangeStore {
    changes: PendingChanges,
}

impl PendingChangeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `value` as the pending value of `(target, name)`, replacing
    /// any value queued earlier in this cycle.
    pub fn set_property(&mut self, target: &str, name: &str, value: Value) {
        trace!("queue set {target}.{name} = {value}");
        self.changes
            .properties
            .entry(target.to_string())
            .or_default()
            .insert(name.to_string(), value);
    }

    /// Queues an event. Returns `false` if the pair was already queued.
    pub fn add_event(&mut self, event_type: &str, target: &str) -> bool {
        let added = self.changes.events.insert(PendingEvent {
            event_type: event_type.to_string(),
            target: target.to_string(),
        });
        if added {
            trace!("queue notify {event_type} on {target}");
        }
        added
    }

    /// Records a parameter for events of `event_type`. The parameter is
    /// matched against queued events when the message is built, so within a
    /// cycle it may arrive before or after the event itself.
    pub fn add_event_parameter(&mut self, event_type: &str, param: &str, value: Value) {
        trace!(
            "queue parameter {} = {value}",
            qualified_parameter_name(event_type, param)
        );
        self.changes
            .parameters
            .entry(event_type.to_string())
            .or_default()
            .insert(param.to_string(), value);
    }

    pub fn has_changes(&self) -> bool {
        !self.changes.is_empty()
    }

    /// True if an event of `event_type` is queued for any target.
    pub fn has_event_type(&self, event_type: &str) -> bool {
        self.changes
            .events
            .iter()
            .any(|event| event.event_type == event_type)
    }

    pub fn pending_value(&self, target: &str, name: &str) -> Option<&Value> {
        self.changes.properties.get(target)?.get(name)
    }

    pub fn dirty_targets(&self) -> impl Iterator<Item = &str> {
        self.changes.properties.keys().map(String::as_str)
    }

    pub fn queued_events(&self) -> impl Iterator<Item = &PendingEvent> {
        self.changes.events.iter()
    }

    pub fn event_parameters(&self, event_type: &str) -> Option<&Properties> {
        self.changes.parameters(event_type)
    }

    /// Live view of everything pending.
    pub fn changes(&self) -> &PendingChanges {
        &self.changes
    }

    /// Moves the pending changes out of the store, parameters included.
    pub fn take(&mut self) -> PendingChanges {
        std::mem::take(&mut self.changes)
    }

    /// Puts a snapshot taken with [`take`](Self::take) back into the store.
    ///
    /// Changes recorded after the snapshot was taken win over the restored
    /// ones; restored targets and events keep their original precedence.
    pub fn restore(&mut self, snapshot: PendingChanges) {
        let newer = std::mem::replace(&mut self.changes, snapshot);
        self.changes.merge(newer);
    }

    pub fn clear(&mut self) {
        self.changes = PendingChanges::default();
    }
}

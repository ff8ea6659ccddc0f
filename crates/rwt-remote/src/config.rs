//! Dispatcher configuration.

use serde::{Deserialize, Serialize};

use crate::error::CodecError;

/// Fully qualified event types the legacy parameter router knows about.
pub const DEFAULT_EVENT_TYPES: &[&str] = &[
    "org.eclipse.swt.events.widgetSelected",
    "org.eclipse.swt.events.widgetDefaultSelected",
    "org.eclipse.swt.events.focusGained",
    "org.eclipse.swt.events.focusLost",
    "org.eclipse.swt.events.mouseDown",
    "org.eclipse.swt.events.mouseUp",
    "org.eclipse.swt.events.mouseDoubleClick",
    "org.eclipse.swt.events.keyDown",
    "org.eclipse.swt.events.menuShown",
    "org.eclipse.swt.events.menuHidden",
    "org.eclipse.swt.events.treeExpanded",
    "org.eclipse.swt.events.treeCollapsed",
    "org.eclipse.swt.events.shellClosed",
    "org.eclipse.swt.events.controlActivated",
    "org.eclipse.swt.events.controlDeactivated",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DispatcherConfig {
    /// Request counter of the first message of the session.
    pub initial_request_counter: u64,
    /// Event types recognised as prefixes by
    /// [`ChangeDispatcher::add_parameter`](crate::ChangeDispatcher::add_parameter).
    pub event_types: Vec<String>,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            initial_request_counter: 0,
            event_types: DEFAULT_EVENT_TYPES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl DispatcherConfig {
    pub fn from_json_str(s: &str) -> Result<Self, CodecError> {
        Ok(serde_json::from_str(s)?)
    }

    /// Adds an event type to the router's vocabulary.
    pub fn with_event_type(mut self, event_type: impl Into<String>) -> Self {
        let event_type = event_type.into();
        if !self.event_types.contains(&event_type) {
            self.event_types.push(event_type);
        }
        self
    }

    pub fn with_initial_request_counter(mut self, counter: u64) -> Self {
        self.initial_request_counter = counter;
        self
    }
}

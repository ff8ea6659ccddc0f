//! Per-target memory of the values the server already knows.
//!
//! The dispatcher only coalesces writes within one request. A
//! [`RemoteAdapter`] sits in front of it and drops writes whose value is
//! identical to what was last confirmed as transmitted, so an unchanged
//! property never produces a `set` operation.

use indexmap::IndexMap;
use serde_json::Value;

use crate::dispatcher::ChangeDispatcher;
use crate::error::DispatchError;
use crate::message::Message;
use crate::operation::Operation;
use crate::transport::Transport;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RemoteAdapter {
    id: String,
    initialized: bool,
    preserved: IndexMap<String, Value>,
}

impl RemoteAdapter {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            initialized: false,
            preserved: IndexMap::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Whether the remote side has received this target at least once.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn set_initialized(&mut self, initialized: bool) {
        self.initialized = initialized;
    }

    pub fn preserve(&mut self, name: &str, value: Value) {
        self.preserved.insert(name.to_string(), value);
    }

    pub fn preserved(&self, name: &str) -> Option<&Value> {
        self.preserved.get(name)
    }

    pub fn clear_preserved(&mut self) {
        self.preserved.clear();
    }

    /// True if `value` differs from what the remote side holds for `name`.
    ///
    /// Before initialization the remote side holds `default`; afterwards it
    /// holds the preserved value, or `default` if none was preserved.
    pub fn has_changed(&self, name: &str, value: &Value, default: &Value) -> bool {
        let remote = if self.initialized {
            self.preserved.get(name).unwrap_or(default)
        } else {
            default
        };
        remote != value
    }

    /// Queues `value` on `dispatcher` if it differs from the remote value.
    /// Returns whether a change was queued.
    pub fn render_property<T: Transport>(
        &self,
        dispatcher: &mut ChangeDispatcher<T>,
        name: &str,
        value: impl Into<Value>,
        default: &Value,
    ) -> Result<bool, DispatchError> {
        let value = value.into();
        if !self.has_changed(name, &value, default) {
            return Ok(false);
        }
        dispatcher.set_property(&self.id, name, value)?;
        Ok(true)
    }

    /// Records every value a completed message sent to this target. Only
    /// `set` and `create` operations mark the target initialized; a `notify`
    /// carries no property values.
    pub fn confirm(&mut self, message: &Message) {
        for op in message.operations() {
            if op.target() != self.id {
                continue;
            }
            match op {
                Operation::Set { properties, .. } => {
                    for (name, value) in properties {
                        self.preserved.insert(name.clone(), value.clone());
                    }
                    self.initialized = true;
                }
                Operation::Create { .. } => self.initialized = true,
                _ => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MemoryTransport;
    use serde_json::json;

    #[test]
    fn uninitialized_target_compares_against_default() {
        let adapter = RemoteAdapter::new("w4");
        assert!(!adapter.has_changed("toolTip", &Value::Null, &Value::Null));
        assert!(adapter.has_changed("toolTip", &json!("foo"), &Value::Null));
    }

    #[test]
    fn initialized_target_compares_against_preserved() {
        let mut adapter = RemoteAdapter::new("w4");
        adapter.set_initialized(true);
        adapter.preserve("toolTip", json!("foo"));
        assert!(!adapter.has_changed("toolTip", &json!("foo"), &Value::Null));
        assert!(adapter.has_changed("toolTip", &json!("bar"), &Value::Null));
        adapter.clear_preserved();
        assert!(adapter.has_changed("toolTip", &json!("foo"), &Value::Null));
    }

    #[test]
    fn unchanged_value_is_not_queued() {
        let mut dispatcher = ChangeDispatcher::new(MemoryTransport::new());
        let mut adapter = RemoteAdapter::new("w4");

        assert!(adapter
            .render_property(&mut dispatcher, "text", "Tab", &json!(""))
            .unwrap());
        let message = dispatcher.send().unwrap();
        adapter.confirm(&message);
        assert!(adapter.is_initialized());
        assert_eq!(adapter.preserved("text"), Some(&json!("Tab")));

        assert!(!adapter
            .render_property(&mut dispatcher, "text", "Tab", &json!(""))
            .unwrap());
        assert_eq!(dispatcher.send().unwrap().operation_count(), 0);
    }

    #[test]
    fn confirm_ignores_other_targets() {
        let mut adapter = RemoteAdapter::new("w4");
        let mut properties = crate::operation::Properties::new();
        properties.insert("text".into(), json!("x"));
        adapter.confirm(&Message::new(
            0,
            vec![Operation::Set {
                target: "w5".into(),
                properties,
            }],
        ));
        assert!(!adapter.is_initialized());
        assert!(adapter.preserved("text").is_none());
    }

    #[test]
    fn notify_alone_does_not_initialize() {
        let mut adapter = RemoteAdapter::new("w4");
        adapter.confirm(&Message::new(
            0,
            vec![Operation::Notify {
                target: "w4".into(),
                event: "org.eclipse.swt.events.widgetSelected".into(),
                properties: crate::operation::Properties::new(),
            }],
        ));
        assert!(!adapter.is_initialized());

        adapter.confirm(&Message::new(
            1,
            vec![Operation::Create {
                target: "w4".into(),
                widget_type: "rwt.widgets.TabItem".into(),
                properties: crate::operation::Properties::new(),
            }],
        ));
        assert!(adapter.is_initialized());
    }
}

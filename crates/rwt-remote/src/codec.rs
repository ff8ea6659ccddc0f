//! JSON codec for protocol messages.
//!
//! Converts [`Message`]s and [`Operation`]s to/from `serde_json::Value`:
//!
//! ```json
//! { "meta": { "requestCounter": 3 },
//!   "operations": [ { "type": "set", "target": "w3", "properties": { "myProp": 42 } } ] }
//! ```

use serde_json::{json, Map, Value};

use crate::error::CodecError;
use crate::message::Message;
use crate::operation::{Operation, OperationType, Properties};

const META: &str = "meta";
const REQUEST_COUNTER: &str = "requestCounter";
const OPERATIONS: &str = "operations";
const TYPE: &str = "type";
const TARGET: &str = "target";
const PROPERTIES: &str = "properties";
const EVENT: &str = "event";
const WIDGET_TYPE: &str = "widgetType";
const METHOD: &str = "method";

// ── Field helpers ─────────────────────────────────────────────────────────

fn field<'a>(obj: &'a Map<String, Value>, name: &'static str) -> Result<&'a Value, CodecError> {
    obj.get(name).ok_or(CodecError::MissingField(name))
}

fn str_field(obj: &Map<String, Value>, name: &'static str) -> Result<String, CodecError> {
    field(obj, name)?
        .as_str()
        .map(str::to_string)
        .ok_or(CodecError::InvalidField(name))
}

/// `properties` is optional on the wire; absent means empty.
fn properties_field(obj: &Map<String, Value>) -> Result<Properties, CodecError> {
    match obj.get(PROPERTIES) {
        None | Some(Value::Null) => Ok(Properties::new()),
        Some(Value::Object(props)) => Ok(props.clone()),
        Some(_) => Err(CodecError::InvalidField(PROPERTIES)),
    }
}

// ── Serialization ─────────────────────────────────────────────────────────

pub fn operation_to_json(op: &Operation) -> Value {
    let mut m = Map::new();
    m.insert(TYPE.into(), json!(op.op_type().as_str()));
    m.insert(TARGET.into(), json!(op.target()));
    match op {
        Operation::Set { properties, .. } => {
            m.insert(PROPERTIES.into(), Value::Object(properties.clone()));
        }
        Operation::Notify {
            event, properties, ..
        } => {
            m.insert(EVENT.into(), json!(event));
            m.insert(PROPERTIES.into(), Value::Object(properties.clone()));
        }
        Operation::Create {
            widget_type,
            properties,
            ..
        } => {
            m.insert(WIDGET_TYPE.into(), json!(widget_type));
            m.insert(PROPERTIES.into(), Value::Object(properties.clone()));
        }
        Operation::Destroy { .. } => {}
        Operation::Call {
            method, properties, ..
        } => {
            m.insert(METHOD.into(), json!(method));
            m.insert(PROPERTIES.into(), Value::Object(properties.clone()));
        }
    }
    Value::Object(m)
}

pub fn message_to_json(message: &Message) -> Value {
    let operations: Vec<Value> = message.operations().iter().map(operation_to_json).collect();
    json!({
        META: { REQUEST_COUNTER: message.request_counter() },
        OPERATIONS: operations,
    })
}

pub fn message_to_string(message: &Message) -> String {
    message_to_json(message).to_string()
}

// ── Deserialization ───────────────────────────────────────────────────────

pub fn operation_from_json(v: &Value) -> Result<Operation, CodecError> {
    let obj = v.as_object().ok_or(CodecError::NotAnObject)?;
    let op_type = OperationType::from_str(&str_field(obj, TYPE)?)?;
    let target = str_field(obj, TARGET)?;
    Ok(match op_type {
        OperationType::Set => Operation::Set {
            target,
            properties: properties_field(obj)?,
        },
        OperationType::Notify => Operation::Notify {
            target,
            event: str_field(obj, EVENT)?,
            properties: properties_field(obj)?,
        },
        OperationType::Create => Operation::Create {
            target,
            widget_type: str_field(obj, WIDGET_TYPE)?,
            properties: properties_field(obj)?,
        },
        OperationType::Destroy => Operation::Destroy { target },
        OperationType::Call => Operation::Call {
            target,
            method: str_field(obj, METHOD)?,
            properties: properties_field(obj)?,
        },
    })
}

pub fn message_from_json(v: &Value) -> Result<Message, CodecError> {
    let obj = v.as_object().ok_or(CodecError::NotAnObject)?;
    let meta = field(obj, META)?
        .as_object()
        .ok_or(CodecError::InvalidField(META))?;
    let request_counter = field(meta, REQUEST_COUNTER)?
        .as_u64()
        .ok_or(CodecError::InvalidField(REQUEST_COUNTER))?;
    let operations = field(obj, OPERATIONS)?
        .as_array()
        .ok_or(CodecError::InvalidField(OPERATIONS))?
        .iter()
        .map(operation_from_json)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Message::new(request_counter, operations))
}

pub fn message_from_str(s: &str) -> Result<Message, CodecError> {
    let v: Value = serde_json::from_str(s)?;
    message_from_json(&v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_set_operation() {
        let mut properties = Properties::new();
        properties.insert("myProp".into(), json!(42));
        let op = Operation::Set {
            target: "w3".into(),
            properties,
        };
        assert_eq!(
            operation_to_json(&op),
            json!({ "type": "set", "target": "w3", "properties": { "myProp": 42 } })
        );
    }

    #[test]
    fn destroy_has_no_properties_key() {
        let v = operation_to_json(&Operation::Destroy {
            target: "w9".into(),
        });
        assert_eq!(v, json!({ "type": "destroy", "target": "w9" }));
    }

    #[test]
    fn encodes_message_meta() {
        let message = Message::new(7, Vec::new());
        assert_eq!(
            message_to_json(&message),
            json!({ "meta": { "requestCounter": 7 }, "operations": [] })
        );
    }

    #[test]
    fn property_order_survives_encoding() {
        let mut properties = Properties::new();
        properties.insert("zeta".into(), json!(1));
        properties.insert("alpha".into(), json!(2));
        let message = Message::new(
            0,
            vec![Operation::Set {
                target: "w1".into(),
                properties,
            }],
        );
        let text = message_to_string(&message);
        assert!(text.find("zeta").unwrap() < text.find("alpha").unwrap());
    }

    #[test]
    fn decodes_all_operation_kinds() {
        let text = r#"{
            "meta": { "requestCounter": 12 },
            "operations": [
                { "type": "create", "target": "w4", "widgetType": "rwt.widgets.TabItem",
                  "properties": { "parent": "w2", "index": 0 } },
                { "type": "set", "target": "w4", "properties": { "text": "Tab" } },
                { "type": "call", "target": "w4", "method": "select" },
                { "type": "notify", "target": "w4", "event": "org.eclipse.swt.events.widgetSelected" },
                { "type": "destroy", "target": "w4" }
            ]
        }"#;
        let message = message_from_str(text).unwrap();
        assert_eq!(message.request_counter(), 12);
        let types: Vec<_> = message.operations().iter().map(|op| op.op_type()).collect();
        assert_eq!(
            types,
            vec![
                OperationType::Create,
                OperationType::Set,
                OperationType::Call,
                OperationType::Notify,
                OperationType::Destroy,
            ]
        );
        assert!(message.operation(2).unwrap().properties().is_empty());
        assert_eq!(message_from_json(&message_to_json(&message)).unwrap(), message);
    }

    #[test]
    fn rejects_malformed_input() {
        assert_eq!(message_from_json(&json!([])), Err(CodecError::NotAnObject));
        assert_eq!(
            message_from_json(&json!({ "operations": [] })),
            Err(CodecError::MissingField("meta"))
        );
        assert_eq!(
            message_from_json(&json!({ "meta": { "requestCounter": "1" }, "operations": [] })),
            Err(CodecError::InvalidField("requestCounter"))
        );
        assert_eq!(
            operation_from_json(&json!({ "type": "listen", "target": "w1" })),
            Err(CodecError::UnknownOperationType("listen".into()))
        );
        assert_eq!(
            operation_from_json(&json!({ "type": "notify", "target": "w1" })),
            Err(CodecError::MissingField("event"))
        );
        assert_eq!(
            operation_from_json(&json!({ "type": "set", "target": "w1", "properties": 3 })),
            Err(CodecError::InvalidField("properties"))
        );
        assert!(matches!(message_from_str("{"), Err(CodecError::Json(_))));
    }
}

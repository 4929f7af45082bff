use crate::types::constants::{HEARTBEAT_PROPERTY, HEARTBEAT_REPLY};
use crate::types::{LiveError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A decoded inbound frame: a JSON object whose first top-level key names
/// the property being updated.
///
/// Keys keep document order, so [`property`](Self::property) is the first
/// key the server wrote.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct InboundMessage(Map<String, Value>);

impl InboundMessage {
    pub fn new(property: impl Into<String>, value: Value) -> Self {
        let mut map = Map::new();
        map.insert(property.into(), value);
        Self(map)
    }

    /// Parses a text frame. Anything other than a JSON object is rejected.
    pub fn parse(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// The routing key: the first top-level property, if any
    pub fn property(&self) -> Option<&str> {
        self.0.keys().next().map(String::as_str)
    }

    /// The value of the routing property
    pub fn value(&self) -> Option<&Value> {
        self.0.values().next()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Whether the server is asking for a liveness reply.
    ///
    /// Only a truthy `heartbeat` value counts; `{"heartbeat": false}` is an
    /// ordinary property update.
    pub fn is_heartbeat_probe(&self) -> bool {
        self.0.get(HEARTBEAT_PROPERTY).is_some_and(is_truthy)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl TryFrom<Value> for InboundMessage {
    type Error = LiveError;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(LiveError::InvalidMessage(format!(
                "expected a JSON object, got {}",
                other
            ))),
        }
    }
}

/// The fixed reply to a heartbeat probe: `{"heartbeat":"pong"}`
pub fn heartbeat_reply() -> String {
    serde_json::json!({ HEARTBEAT_PROPERTY: HEARTBEAT_REPLY }).to_string()
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

//! Gateway message envelope
//!
//! Every text frame in either direction is `{"event": "...", "data": {...}}`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{CloseCode, ServerEvent};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayMessage {
    pub event: String,

    #[serde(default)]
    pub data: Value,
}

impl GatewayMessage {
    /// Build a server event from any serializable payload
    ///
    /// A payload that fails to serialize is logged and sent as `data: null`.
    #[must_use]
    pub fn new(event: ServerEvent, payload: &impl Serialize) -> Self {
        let data = serde_json::to_value(payload).unwrap_or_else(|e| {
            tracing::error!(event = %event, error = %e, "Failed to serialize event payload");
            Value::Null
        });

        Self {
            event: event.as_str().to_string(),
            data,
        }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Decode the `data` field into a typed payload
    pub fn payload<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        T::deserialize(&self.data)
    }
}

/// What a connection's send loop writes to the socket
#[derive(Debug, Clone, PartialEq)]
pub enum Outbound {
    Message(GatewayMessage),
    /// Protocol-level keepalive
    Ping,
    /// Send a close frame and stop
    Close(CloseCode),
}

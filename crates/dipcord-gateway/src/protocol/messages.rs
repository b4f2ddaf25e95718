//! Gateway message format
//!
//! Every frame in either direction is `{op, t?, s?, d?}`.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{CloseCode, HelloPayload, OpCode};

/// Gateway message format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayMessage {
    /// Operation code
    pub op: OpCode,

    /// Event type (only for op=0 Dispatch)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub t: Option<String>,

    /// Sequence number (only for op=0 Dispatch)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s: Option<u64>,

    /// Event data payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub d: Option<Value>,
}

impl GatewayMessage {
    fn bare(op: OpCode) -> Self {
        Self {
            op,
            t: None,
            s: None,
            d: None,
        }
    }

    // === Server Messages ===

    /// Create a Dispatch message (op=0)
    #[must_use]
    pub fn dispatch(event_type: impl Into<String>, sequence: u64, data: Value) -> Self {
        Self {
            op: OpCode::Dispatch,
            t: Some(event_type.into()),
            s: Some(sequence),
            d: Some(data),
        }
    }

    /// Create a Hello message (op=10)
    #[must_use]
    pub fn hello(payload: HelloPayload) -> Self {
        Self {
            d: serde_json::to_value(payload).ok(),
            ..Self::bare(OpCode::Hello)
        }
    }

    /// Create a Heartbeat ACK message (op=11)
    #[must_use]
    pub fn heartbeat_ack() -> Self {
        Self::bare(OpCode::HeartbeatAck)
    }

    /// Create an Invalid Session message (op=9)
    ///
    /// Sessions never resume, so the payload is always `false`.
    #[must_use]
    pub fn invalid_session() -> Self {
        Self {
            d: Some(Value::Bool(false)),
            ..Self::bare(OpCode::InvalidSession)
        }
    }

    // === Parsing Client Messages ===

    /// Parse a client text frame
    ///
    /// Well-formed JSON with an op number we do not know is `UnknownOpcode`;
    /// anything else that fails to parse is `DecodeError`.
    pub fn parse(text: &str) -> Result<Self, CloseCode> {
        let raw: Value = serde_json::from_str(text).map_err(|_| CloseCode::DecodeError)?;

        let op = raw
            .get("op")
            .and_then(Value::as_u64)
            .ok_or(CloseCode::DecodeError)?;
        if u8::try_from(op).ok().and_then(OpCode::from_u8).is_none() {
            return Err(CloseCode::UnknownOpcode);
        }

        serde_json::from_value(raw).map_err(|_| CloseCode::DecodeError)
    }

    /// Decode `d` into an op-specific payload
    pub fn payload<T: DeserializeOwned>(&self) -> Option<T> {
        self.d
            .as_ref()
            .and_then(|d| serde_json::from_value(d.clone()).ok())
    }

    // === Utilities ===

    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl std::fmt::Display for GatewayMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(t) = &self.t {
            write!(f, "GatewayMessage(op={}, t={}", self.op, t)?;
            if let Some(s) = self.s {
                write!(f, ", s={s}")?;
            }
            write!(f, ")")
        } else {
            write!(f, "GatewayMessage(op={})", self.op)
        }
    }
}

//! Gateway operation codes

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Gateway operation codes
///
/// Op codes define the type of message being sent or received over the WebSocket connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum OpCode {
    /// Server dispatches an event to the client (server only)
    Dispatch = 0,
    /// Heartbeat - keep connection alive (client only)
    Heartbeat = 1,
    /// Identify - authenticate session (client only)
    Identify = 2,
    /// Start receiving a channel's events (client only)
    Subscribe = 3,
    /// Stop receiving a channel's events (client only)
    Unsubscribe = 4,
    /// Typing started or stopped in a channel (client only)
    Typing = 5,
    /// Invalid Session - session is invalid (server only)
    InvalidSession = 9,
    /// Hello - sent on connect (server only)
    Hello = 10,
    /// Heartbeat ACK - heartbeat acknowledged (server only)
    HeartbeatAck = 11,
}

impl OpCode {
    /// Create an `OpCode` from a raw integer value
    #[must_use]
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Dispatch),
            1 => Some(Self::Heartbeat),
            2 => Some(Self::Identify),
            3 => Some(Self::Subscribe),
            4 => Some(Self::Unsubscribe),
            5 => Some(Self::Typing),
            9 => Some(Self::InvalidSession),
            10 => Some(Self::Hello),
            11 => Some(Self::HeartbeatAck),
            _ => None,
        }
    }

    /// Get the raw integer value
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Check if this op code can be sent by the client
    #[must_use]
    pub const fn is_client_op(self) -> bool {
        matches!(
            self,
            Self::Heartbeat | Self::Identify | Self::Subscribe | Self::Unsubscribe | Self::Typing
        )
    }

    /// Ops a client may send before Identify
    #[must_use]
    pub const fn allowed_before_identify(self) -> bool {
        matches!(self, Self::Heartbeat | Self::Identify)
    }

    /// Get the name of this op code
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Dispatch => "Dispatch",
            Self::Heartbeat => "Heartbeat",
            Self::Identify => "Identify",
            Self::Subscribe => "Subscribe",
            Self::Unsubscribe => "Unsubscribe",
            Self::Typing => "Typing",
            Self::InvalidSession => "InvalidSession",
            Self::Hello => "Hello",
            Self::HeartbeatAck => "HeartbeatAck",
        }
    }
}

impl Serialize for OpCode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u8(self.as_u8())
    }
}

impl<'de> Deserialize<'de> for OpCode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = u8::deserialize(deserializer)?;
        Self::from_u8(value)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid op code: {value}")))
    }
}

impl std::fmt::Display for OpCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name(), self.as_u8())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opcode_from_u8() {
        assert_eq!(OpCode::from_u8(0), Some(OpCode::Dispatch));
        assert_eq!(OpCode::from_u8(3), Some(OpCode::Subscribe));
        assert_eq!(OpCode::from_u8(5), Some(OpCode::Typing));
        assert_eq!(OpCode::from_u8(9), Some(OpCode::InvalidSession));
        assert_eq!(OpCode::from_u8(11), Some(OpCode::HeartbeatAck));
        assert_eq!(OpCode::from_u8(6), None);
        assert_eq!(OpCode::from_u8(7), None);
        assert_eq!(OpCode::from_u8(255), None);
    }

    #[test]
    fn test_client_ops() {
        assert!(OpCode::Heartbeat.is_client_op());
        assert!(OpCode::Identify.is_client_op());
        assert!(OpCode::Subscribe.is_client_op());
        assert!(OpCode::Unsubscribe.is_client_op());
        assert!(OpCode::Typing.is_client_op());
        assert!(!OpCode::Dispatch.is_client_op());
        assert!(!OpCode::Hello.is_client_op());
        assert!(!OpCode::HeartbeatAck.is_client_op());
    }

    #[test]
    fn test_ops_before_identify() {
        assert!(OpCode::Heartbeat.allowed_before_identify());
        assert!(OpCode::Identify.allowed_before_identify());
        assert!(!OpCode::Subscribe.allowed_before_identify());
        assert!(!OpCode::Typing.allowed_before_identify());
    }

    #[test]
    fn test_opcode_serialization() {
        assert_eq!(serde_json::to_string(&OpCode::Hello).unwrap(), "10");

        let op: OpCode = serde_json::from_str("2").unwrap();
        assert_eq!(op, OpCode::Identify);
        assert!(serde_json::from_str::<OpCode>("8").is_err());
    }

    #[test]
    fn test_opcode_display() {
        assert_eq!(OpCode::Hello.to_string(), "Hello (10)");
        assert_eq!(OpCode::Typing.to_string(), "Typing (5)");
    }
}

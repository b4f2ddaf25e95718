//! Payload definitions for the `d` field

use dipcord_core::Snowflake;
use dipcord_service::dto::CurrentUserResponse;
use serde::{Deserialize, Serialize};

/// Payload for op 10 (Hello)
///
/// Sent by the server immediately after connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelloPayload {
    /// Heartbeat interval in milliseconds
    pub heartbeat_interval: u64,
}

impl HelloPayload {
    #[must_use]
    pub fn with_interval(heartbeat_interval: u64) -> Self {
        Self { heartbeat_interval }
    }
}

/// Payload for op 2 (Identify)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentifyPayload {
    /// Access token, with or without a `Bearer ` prefix
    pub token: String,
}

impl IdentifyPayload {
    /// The raw JWT
    #[must_use]
    pub fn bare_token(&self) -> &str {
        self.token.strip_prefix("Bearer ").unwrap_or(&self.token)
    }
}

/// Payload for ops 3 and 4 (Subscribe / Unsubscribe)
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ChannelPayload {
    pub channel_id: Snowflake,
}

/// Payload for op 5 (Typing)
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TypingPayload {
    pub channel_id: Snowflake,
    /// `true` when typing starts, `false` when it stops
    #[serde(default = "default_typing")]
    pub typing: bool,
}

fn default_typing() -> bool {
    true
}

/// Data of the `ready` dispatch that answers a successful Identify
#[derive(Debug, Clone, Serialize)]
pub struct ReadyPayload {
    pub session_id: String,
    pub user: CurrentUserResponse,
    pub channel_ids: Vec<Snowflake>,
}

/// Event name of the dispatch sent after Identify
pub const READY_EVENT: &str = "ready";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_prefix_is_optional() {
        let bare = IdentifyPayload {
            token: "abc.def.ghi".to_string(),
        };
        let prefixed = IdentifyPayload {
            token: "Bearer abc.def.ghi".to_string(),
        };
        assert_eq!(bare.bare_token(), "abc.def.ghi");
        assert_eq!(prefixed.bare_token(), "abc.def.ghi");
    }

    #[test]
    fn test_channel_payload_takes_string_ids() {
        let payload: ChannelPayload =
            serde_json::from_value(serde_json::json!({"channel_id": "123456"})).unwrap();
        assert_eq!(payload.channel_id, Snowflake::new(123_456));
    }

    #[test]
    fn test_typing_defaults_to_start() {
        let payload: TypingPayload =
            serde_json::from_value(serde_json::json!({"channel_id": "9"})).unwrap();
        assert!(payload.typing);

        let payload: TypingPayload =
            serde_json::from_value(serde_json::json!({"channel_id": "9", "typing": false}))
                .unwrap();
        assert!(!payload.typing);
    }
}

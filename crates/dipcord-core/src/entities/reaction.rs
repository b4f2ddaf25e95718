//! Reaction entity - a user's emoji on a message

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::value_objects::Snowflake;

/// One row per (message, user, emoji)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageReaction {
    pub message_id: Snowflake,
    pub user_id: Snowflake,
    pub emoji: String,
    pub created_at: DateTime<Utc>,
}

impl MessageReaction {
    pub const MAX_EMOJI_LEN: usize = 64;

    pub fn new(message_id: Snowflake, user_id: Snowflake, emoji: String) -> Self {
        Self {
            message_id,
            user_id,
            emoji,
            created_at: Utc::now(),
        }
    }

    /// Non-blank and at most [`MAX_EMOJI_LEN`](Self::MAX_EMOJI_LEN) characters
    pub fn is_valid_emoji(emoji: &str) -> bool {
        let len = emoji.chars().count();
        !emoji.trim().is_empty() && len <= Self::MAX_EMOJI_LEN
    }
}

/// Aggregated reactions for one emoji on one message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReactionSummary {
    pub emoji: String,
    pub count: i64,
    /// Whether the viewing user is among the reactors
    pub me: bool,
}

impl ReactionSummary {
    pub fn new(emoji: String, count: i64, me: bool) -> Self {
        Self { emoji, count, me }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emoji_validation() {
        assert!(MessageReaction::is_valid_emoji("👍"));
        assert!(MessageReaction::is_valid_emoji(":custom_emoji:"));
        assert!(!MessageReaction::is_valid_emoji(""));
        assert!(!MessageReaction::is_valid_emoji("   "));
        assert!(!MessageReaction::is_valid_emoji(&"x".repeat(65)));
        assert!(MessageReaction::is_valid_emoji(&"x".repeat(64)));
    }

    #[test]
    fn test_summary_serializes() {
        let summary = ReactionSummary::new("🔥".to_string(), 3, true);
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["count"], 3);
        assert_eq!(json["me"], true);
    }
}

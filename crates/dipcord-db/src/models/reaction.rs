//! Reaction database models

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for message_reactions table
#[derive(Debug, Clone, FromRow)]
pub struct ReactionModel {
    pub message_id: i64,
    pub user_id: i64,
    pub emoji: String,
    pub created_at: DateTime<Utc>,
}

/// Aggregated reaction counts per (message, emoji)
#[derive(Debug, Clone, FromRow)]
pub struct ReactionCountModel {
    pub message_id: i64,
    pub emoji: String,
    pub count: i64,
    /// Whether the viewing user reacted with this emoji
    pub me: bool,
}

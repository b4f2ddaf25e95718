//! Message database models

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for messages table
#[derive(Debug, Clone, FromRow)]
pub struct MessageModel {
    pub id: i64,
    pub channel_id: i64,
    pub user_id: i64,
    pub content: String,
    pub parent_message_id: Option<i64>,
    pub is_edited: bool,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Database model for message_attachments table
#[derive(Debug, Clone, FromRow)]
pub struct AttachmentModel {
    pub id: i64,
    pub message_id: i64,
    pub filename: String,
    pub url: String,
    pub content_type: Option<String>,
    pub size_bytes: i64,
}

#[derive(Debug, Clone, FromRow)]
pub struct MentionModel {
    pub message_id: i64,
    pub user_id: i64,
}

/// Aggregate: number of live replies under a thread root
#[derive(Debug, Clone, FromRow)]
pub struct ReplyCountModel {
    pub parent_message_id: i64,
    pub reply_count: i64,
}

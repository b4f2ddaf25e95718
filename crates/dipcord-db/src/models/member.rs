//! Channel member database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for the channel_members table
#[derive(Debug, Clone, FromRow)]
pub struct MemberModel {
    pub channel_id: i64,
    pub user_id: i64,
    pub role: String,
    pub permissions: i64,
    pub joined_at: DateTime<Utc>,
}

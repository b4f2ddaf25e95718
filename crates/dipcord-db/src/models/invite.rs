//! Invite database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct InviteModel {
    pub id: i64,
    pub code: String,
    pub channel_id: i64,
    pub created_by_user_id: i64,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_used: bool,
    pub used_by_user_id: Option<i64>,
    pub used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

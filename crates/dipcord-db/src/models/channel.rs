//! Channel database models

use chrono::{DateTime, Utc};
use dipcord_core::AccessSettings;
use sqlx::types::Json;
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct ChannelModel {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub max_participants: i32,
    pub access_settings: Json<AccessSettings>,
    pub created_by: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Channel row joined with its member count (discovery listing)
#[derive(Debug, Clone, FromRow)]
pub struct ChannelWithCountModel {
    #[sqlx(flatten)]
    pub channel: ChannelModel,
    pub member_count: i64,
}

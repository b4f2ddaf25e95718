//! Poll database models

use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct PollModel {
    pub id: i64,
    pub channel_id: i64,
    pub created_by: i64,
    pub question: String,
    pub allow_multiple: bool,
    pub closes_at: Option<DateTime<Utc>>,
    pub is_closed: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct PollOptionModel {
    pub id: i64,
    pub poll_id: i64,
    pub text: String,
    pub position: i32,
}

#[derive(Debug, Clone, FromRow)]
pub struct PollVoteModel {
    pub poll_id: i64,
    pub option_id: i64,
    pub user_id: i64,
}

#[derive(Debug, Clone, FromRow)]
pub struct OptionCountModel {
    pub option_id: i64,
    pub votes: i64,
}

#[derive(Debug, Clone, FromRow)]
pub struct VoterCountModel {
    pub poll_id: i64,
    pub voters: i64,
}

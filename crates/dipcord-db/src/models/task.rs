//! Task database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct TaskModel {
    pub id: i64,
    pub channel_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub assignee_id: Option<i64>,
    pub created_by: i64,
    pub due_date: Option<DateTime<Utc>>,
    pub position: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

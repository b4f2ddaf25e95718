//! Task entity - a kanban card that belongs to a channel

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::value_objects::Snowflake;

/// Kanban column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Done,
}

impl TaskStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::InProgress => "in_progress",
            Self::Done => "done",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "todo" => Some(Self::Todo),
            "in_progress" => Some(Self::InProgress),
            "done" => Some(Self::Done),
            _ => None,
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: Snowflake,
    pub channel_id: Snowflake,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub assignee_id: Option<Snowflake>,
    pub created_by: Snowflake,
    pub due_date: Option<DateTime<Utc>>,
    /// Order inside the status column, ascending
    pub position: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    pub fn new(id: Snowflake, channel_id: Snowflake, title: String, created_by: Snowflake) -> Self {
        let now = Utc::now();
        Self {
            id,
            channel_id,
            title,
            description: None,
            status: TaskStatus::Todo,
            assignee_id: None,
            created_by,
            due_date: None,
            position: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Creator or assignee
    pub fn is_involved(&self, user_id: Snowflake) -> bool {
        self.created_by == user_id || self.assignee_id == Some(user_id)
    }

    pub fn is_overdue(&self) -> bool {
        self.status != TaskStatus::Done && self.due_date.is_some_and(|due| due < Utc::now())
    }

    /// Returns the previous status
    pub fn set_status(&mut self, status: TaskStatus) -> TaskStatus {
        let old = std::mem::replace(&mut self.status, status);
        self.updated_at = Utc::now();
        old
    }
}

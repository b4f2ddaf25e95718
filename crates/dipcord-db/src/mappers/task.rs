//! Task entity <-> model mapper

use dipcord_core::{Snowflake, Task, TaskStatus};

use crate::models::TaskModel;

/// Unknown statuses land back in the first column
pub fn status_from_str(status: &str) -> TaskStatus {
    TaskStatus::parse(status).unwrap_or_default()
}

impl From<TaskModel> for Task {
    fn from(model: TaskModel) -> Self {
        Task {
            id: Snowflake::new(model.id),
            channel_id: Snowflake::new(model.channel_id),
            title: model.title,
            description: model.description,
            status: status_from_str(&model.status),
            assignee_id: model.assignee_id.map(Snowflake::new),
            created_by: Snowflake::new(model.created_by),
            due_date: model.due_date,
            position: model.position,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

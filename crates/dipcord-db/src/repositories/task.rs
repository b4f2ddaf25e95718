//! PostgreSQL implementation of TaskRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use dipcord_core::{DomainError, RepoResult, Snowflake, Task, TaskRepository, TaskStatus};

use crate::models::TaskModel;

use super::error::map_db_error;

/// PostgreSQL implementation of TaskRepository
#[derive(Clone)]
pub struct PgTaskRepository {
    pool: PgPool,
}

impl PgTaskRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TaskRepository for PgTaskRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Task>> {
        let result = sqlx::query_as::<_, TaskModel>(
            r"
            SELECT id, channel_id, title, description, status, assignee_id, created_by,
                   due_date, position, created_at, updated_at
            FROM tasks
            WHERE id = $1
            ",
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Task::from))
    }

    #[instrument(skip(self))]
    async fn find_by_channel(
        &self,
        channel_id: Snowflake,
        status: Option<TaskStatus>,
    ) -> RepoResult<Vec<Task>> {
        let results = sqlx::query_as::<_, TaskModel>(
            r"
            SELECT id, channel_id, title, description, status, assignee_id, created_by,
                   due_date, position, created_at, updated_at
            FROM tasks
            WHERE channel_id = $1 AND ($2::TEXT IS NULL OR status = $2)
            ORDER BY CASE status WHEN 'todo' THEN 0 WHEN 'in_progress' THEN 1 ELSE 2 END,
                     position, id
            ",
        )
        .bind(channel_id.into_inner())
        .bind(status.map(TaskStatus::as_str))
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Task::from).collect())
    }

    #[instrument(skip(self))]
    async fn next_position(&self, channel_id: Snowflake, status: TaskStatus) -> RepoResult<i32> {
        sqlx::query_scalar::<_, i32>(
            "SELECT COALESCE(MAX(position) + 1, 0) FROM tasks WHERE channel_id = $1 AND status = $2",
        )
        .bind(channel_id.into_inner())
        .bind(status.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)
    }

    #[instrument(skip(self, task), fields(task_id = %task.id))]
    async fn create(&self, task: &Task) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO tasks (id, channel_id, title, description, status, assignee_id,
                               created_by, due_date, position, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ",
        )
        .bind(task.id.into_inner())
        .bind(task.channel_id.into_inner())
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.status.as_str())
        .bind(task.assignee_id.map(Snowflake::into_inner))
        .bind(task.created_by.into_inner())
        .bind(task.due_date)
        .bind(task.position)
        .bind(task.created_at)
        .bind(task.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self, task), fields(task_id = %task.id))]
    async fn update(&self, task: &Task) -> RepoResult<()> {
        let result = sqlx::query(
            r"
            UPDATE tasks
            SET title = $2, description = $3, status = $4, assignee_id = $5, due_date = $6,
                position = $7, updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(task.id.into_inner())
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.status.as_str())
        .bind(task.assignee_id.map(Snowflake::into_inner))
        .bind(task.due_date)
        .bind(task.position)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::TaskNotFound(task.id));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Snowflake) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id.into_inner())
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }
}

//! Task service
//!
//! A kanban board per channel. Cards live in one of three status columns and
//! are ordered by position inside their column.

use chrono::Utc;
use dipcord_core::{DomainError, MemberPermissions, RealtimeEvent, Snowflake, Task};
use tracing::{info, instrument};
use validator::Validate;

use crate::dto::{
    CreateTaskRequest, TaskFilter, TaskResponse, UpdateTaskRequest, UpdateTaskStatusRequest,
};

use super::context::ServiceContext;
use super::error::ServiceResult;
use super::permission::{missing_permission, ChannelAccess, PermissionService};

/// Task service
pub struct TaskService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> TaskService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Requires `CREATE_TASKS`. The card goes to the end of its column.
    #[instrument(skip(self, request))]
    pub async fn create_task(
        &self,
        channel_id: Snowflake,
        user_id: Snowflake,
        request: CreateTaskRequest,
    ) -> ServiceResult<TaskResponse> {
        request.validate()?;

        PermissionService::new(self.ctx)
            .require_permission(channel_id, user_id, MemberPermissions::CREATE_TASKS)
            .await?;

        if let Some(assignee_id) = request.assignee_id {
            self.require_assignable(channel_id, assignee_id).await?;
        }

        let status = request.status.unwrap_or_default();
        let mut task = Task::new(
            self.ctx.generate_id(),
            channel_id,
            request.title.trim().to_string(),
            user_id,
        );
        task.description = request.description;
        task.status = status;
        task.assignee_id = request.assignee_id;
        task.due_date = request.due_date;
        task.position = self.ctx.task_repo().next_position(channel_id, status).await?;

        self.ctx.task_repo().create(&task).await?;

        info!(task_id = %task.id, channel_id = %channel_id, status = %status, "Task created");

        self.ctx
            .publish(RealtimeEvent::TaskCreated {
                channel_id,
                task_id: task.id,
            })
            .await;

        Ok(TaskResponse::from(&task))
    }

    /// Board for a channel, ordered by (status, position)
    #[instrument(skip(self))]
    pub async fn list_tasks(
        &self,
        channel_id: Snowflake,
        user_id: Snowflake,
        filter: TaskFilter,
    ) -> ServiceResult<Vec<TaskResponse>> {
        PermissionService::new(self.ctx)
            .require_member(channel_id, user_id)
            .await?;

        let tasks = self
            .ctx
            .task_repo()
            .find_by_channel(channel_id, filter.status)
            .await?;
        Ok(tasks.iter().map(TaskResponse::from).collect())
    }

    #[instrument(skip(self))]
    pub async fn get_task(&self, task_id: Snowflake, user_id: Snowflake) -> ServiceResult<TaskResponse> {
        let task = self.find_task(task_id).await?;
        PermissionService::new(self.ctx)
            .require_member(task.channel_id, user_id)
            .await?;
        Ok(TaskResponse::from(&task))
    }

    /// Creator, assignee, or `MANAGE_TASKS`
    #[instrument(skip(self, request))]
    pub async fn update_task(
        &self,
        task_id: Snowflake,
        user_id: Snowflake,
        request: UpdateTaskRequest,
    ) -> ServiceResult<TaskResponse> {
        request.validate()?;

        let mut task = self.find_task(task_id).await?;
        let access = PermissionService::new(self.ctx)
            .require_member(task.channel_id, user_id)
            .await?;
        require_task_authority(&access, &task, user_id)?;

        if let Some(title) = request.title {
            let title = title.trim().to_string();
            if title.is_empty() {
                return Err(DomainError::ValidationError("Title cannot be blank".into()).into());
            }
            task.title = title;
        }
        if let Some(description) = request.description {
            task.description = description;
        }
        if let Some(assignee_id) = request.assignee_id {
            if let Some(id) = assignee_id {
                self.require_assignable(task.channel_id, id).await?;
            }
            task.assignee_id = assignee_id;
        }
        if let Some(due_date) = request.due_date {
            task.due_date = due_date;
        }
        if let Some(position) = request.position {
            task.position = position;
        }
        task.updated_at = Utc::now();

        self.ctx.task_repo().update(&task).await?;

        info!(task_id = %task_id, "Task updated");

        self.ctx
            .publish(RealtimeEvent::TaskUpdated {
                channel_id: task.channel_id,
                task_id,
            })
            .await;

        Ok(TaskResponse::from(&task))
    }

    /// Move a card to another column
    #[instrument(skip(self, request), fields(status = %request.status))]
    pub async fn update_task_status(
        &self,
        task_id: Snowflake,
        user_id: Snowflake,
        request: UpdateTaskStatusRequest,
    ) -> ServiceResult<TaskResponse> {
        request.validate()?;

        let mut task = self.find_task(task_id).await?;
        let access = PermissionService::new(self.ctx)
            .require_member(task.channel_id, user_id)
            .await?;
        require_task_authority(&access, &task, user_id)?;

        let moved = task.status != request.status;
        let position = match request.position {
            Some(position) => position,
            None if moved => {
                self.ctx
                    .task_repo()
                    .next_position(task.channel_id, request.status)
                    .await?
            }
            None => task.position,
        };

        let old_status = task.set_status(request.status);
        task.position = position;
        self.ctx.task_repo().update(&task).await?;

        info!(
            task_id = %task_id,
            old_status = %old_status,
            new_status = %task.status,
            "Task status changed"
        );

        self.ctx
            .publish(RealtimeEvent::TaskStatusChanged {
                channel_id: task.channel_id,
                task_id,
                old_status,
                new_status: task.status,
            })
            .await;

        Ok(TaskResponse::from(&task))
    }

    /// Creator or `MANAGE_TASKS`
    #[instrument(skip(self))]
    pub async fn delete_task(&self, task_id: Snowflake, user_id: Snowflake) -> ServiceResult<()> {
        let task = self.find_task(task_id).await?;
        let access = PermissionService::new(self.ctx)
            .require_member(task.channel_id, user_id)
            .await?;

        if task.created_by != user_id && !access.member.can(MemberPermissions::MANAGE_TASKS) {
            return Err(missing_permission(MemberPermissions::MANAGE_TASKS));
        }

        if !self.ctx.task_repo().delete(task_id).await? {
            return Err(DomainError::TaskNotFound(task_id).into());
        }

        info!(task_id = %task_id, deleted_by = %user_id, "Task deleted");

        self.ctx
            .publish(RealtimeEvent::TaskDeleted {
                channel_id: task.channel_id,
                task_id,
            })
            .await;

        Ok(())
    }

    async fn find_task(&self, task_id: Snowflake) -> ServiceResult<Task> {
        Ok(self
            .ctx
            .task_repo()
            .find_by_id(task_id)
            .await?
            .ok_or(DomainError::TaskNotFound(task_id))?)
    }

    async fn require_assignable(&self, channel_id: Snowflake, assignee_id: Snowflake) -> ServiceResult<()> {
        if PermissionService::new(self.ctx)
            .is_member(channel_id, assignee_id)
            .await?
        {
            Ok(())
        } else {
            Err(DomainError::ValidationError("Assignee must be a member of the channel".into()).into())
        }
    }
}

fn require_task_authority(access: &ChannelAccess, task: &Task, user_id: Snowflake) -> ServiceResult<()> {
    if task.is_involved(user_id) || access.member.can(MemberPermissions::MANAGE_TASKS) {
        Ok(())
    } else {
        Err(missing_permission(MemberPermissions::MANAGE_TASKS))
    }
}

//! Task board handlers

use axum::{extract::State, Json};
use dipcord_core::Snowflake;
use dipcord_service::{
    dto::{
        CreateTaskRequest, TaskFilter, TaskResponse, UpdateTaskRequest, UpdateTaskStatusRequest,
    },
    TaskService,
};

use crate::extractors::{AuthUser, QueryParams, SnowflakePath, ValidatedJson};
use crate::response::{ApiResult, Created, NoContent};
use crate::state::AppState;

/// Board of a channel, optionally one column via `?status=`
///
/// GET /channels/{channel_id}/tasks
pub async fn list_tasks(
    State(state): State<AppState>,
    auth: AuthUser,
    SnowflakePath(channel_id): SnowflakePath<Snowflake>,
    QueryParams(filter): QueryParams<TaskFilter>,
) -> ApiResult<Json<Vec<TaskResponse>>> {
    let service = TaskService::new(state.service_context());
    let tasks = service.list_tasks(channel_id, auth.user_id, filter).await?;
    Ok(Json(tasks))
}

/// POST /channels/{channel_id}/tasks
pub async fn create_task(
    State(state): State<AppState>,
    auth: AuthUser,
    SnowflakePath(channel_id): SnowflakePath<Snowflake>,
    ValidatedJson(request): ValidatedJson<CreateTaskRequest>,
) -> ApiResult<Created<Json<TaskResponse>>> {
    let service = TaskService::new(state.service_context());
    let response = service
        .create_task(channel_id, auth.user_id, request)
        .await?;
    Ok(Created(Json(response)))
}

/// GET /tasks/{task_id}
pub async fn get_task(
    State(state): State<AppState>,
    auth: AuthUser,
    SnowflakePath(task_id): SnowflakePath<Snowflake>,
) -> ApiResult<Json<TaskResponse>> {
    let service = TaskService::new(state.service_context());
    let response = service.get_task(task_id, auth.user_id).await?;
    Ok(Json(response))
}

/// PATCH /tasks/{task_id}
pub async fn update_task(
    State(state): State<AppState>,
    auth: AuthUser,
    SnowflakePath(task_id): SnowflakePath<Snowflake>,
    ValidatedJson(request): ValidatedJson<UpdateTaskRequest>,
) -> ApiResult<Json<TaskResponse>> {
    let service = TaskService::new(state.service_context());
    let response = service.update_task(task_id, auth.user_id, request).await?;
    Ok(Json(response))
}

/// Move a card between columns
///
/// PUT /tasks/{task_id}/status
pub async fn update_task_status(
    State(state): State<AppState>,
    auth: AuthUser,
    SnowflakePath(task_id): SnowflakePath<Snowflake>,
    ValidatedJson(request): ValidatedJson<UpdateTaskStatusRequest>,
) -> ApiResult<Json<TaskResponse>> {
    let service = TaskService::new(state.service_context());
    let response = service
        .update_task_status(task_id, auth.user_id, request)
        .await?;
    Ok(Json(response))
}

/// DELETE /tasks/{task_id}
pub async fn delete_task(
    State(state): State<AppState>,
    auth: AuthUser,
    SnowflakePath(task_id): SnowflakePath<Snowflake>,
) -> ApiResult<NoContent> {
    let service = TaskService::new(state.service_context());
    service.delete_task(task_id, auth.user_id).await?;
    Ok(NoContent)
}

//! Poll handlers

use axum::{extract::State, Json};
use dipcord_core::Snowflake;
use dipcord_service::{
    dto::{CreatePollRequest, PollResponse, VoteRequest},
    PollService,
};

use crate::extractors::{AuthUser, Pagination, SnowflakePath, ValidatedJson};
use crate::response::{ApiResult, Created};
use crate::state::AppState;

/// GET /channels/{channel_id}/polls
pub async fn list_polls(
    State(state): State<AppState>,
    auth: AuthUser,
    SnowflakePath(channel_id): SnowflakePath<Snowflake>,
    pagination: Pagination,
) -> ApiResult<Json<Vec<PollResponse>>> {
    let service = PollService::new(state.service_context());
    let polls = service
        .list_polls(channel_id, auth.user_id, pagination.into_query())
        .await?;
    Ok(Json(polls))
}

/// POST /channels/{channel_id}/polls
pub async fn create_poll(
    State(state): State<AppState>,
    auth: AuthUser,
    SnowflakePath(channel_id): SnowflakePath<Snowflake>,
    ValidatedJson(request): ValidatedJson<CreatePollRequest>,
) -> ApiResult<Created<Json<PollResponse>>> {
    let service = PollService::new(state.service_context());
    let response = service
        .create_poll(channel_id, auth.user_id, request)
        .await?;
    Ok(Created(Json(response)))
}

/// Poll with per-option counts and the caller's own selection
///
/// GET /polls/{poll_id}
pub async fn get_poll(
    State(state): State<AppState>,
    auth: AuthUser,
    SnowflakePath(poll_id): SnowflakePath<Snowflake>,
) -> ApiResult<Json<PollResponse>> {
    let service = PollService::new(state.service_context());
    let response = service.get_poll(poll_id, auth.user_id).await?;
    Ok(Json(response))
}

/// Replace the caller's votes
///
/// PUT /polls/{poll_id}/votes
pub async fn vote(
    State(state): State<AppState>,
    auth: AuthUser,
    SnowflakePath(poll_id): SnowflakePath<Snowflake>,
    ValidatedJson(request): ValidatedJson<VoteRequest>,
) -> ApiResult<Json<PollResponse>> {
    let service = PollService::new(state.service_context());
    let response = service.vote(poll_id, auth.user_id, request).await?;
    Ok(Json(response))
}

/// DELETE /polls/{poll_id}/votes
pub async fn retract_vote(
    State(state): State<AppState>,
    auth: AuthUser,
    SnowflakePath(poll_id): SnowflakePath<Snowflake>,
) -> ApiResult<Json<PollResponse>> {
    let service = PollService::new(state.service_context());
    let response = service.retract_vote(poll_id, auth.user_id).await?;
    Ok(Json(response))
}

/// POST /polls/{poll_id}/close
pub async fn close_poll(
    State(state): State<AppState>,
    auth: AuthUser,
    SnowflakePath(poll_id): SnowflakePath<Snowflake>,
) -> ApiResult<Json<PollResponse>> {
    let service = PollService::new(state.service_context());
    let response = service.close_poll(poll_id, auth.user_id).await?;
    Ok(Json(response))
}

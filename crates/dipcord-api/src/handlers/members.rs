//! Member handlers
//!
//! Roster listing, adding members, role and permission changes, kicks and leaving.

use axum::{extract::State, Json};
use dipcord_core::Snowflake;
use dipcord_service::{
    dto::{AddMemberRequest, MemberResponse, UpdateMemberRequest},
    MemberService,
};

use crate::extractors::{AuthUser, JsonBody, Pagination, SnowflakePath};
use crate::response::{ApiResult, Created, NoContent};
use crate::state::AppState;

/// Members ordered by user id, paginated with `?after=`
///
/// GET /channels/{channel_id}/members
pub async fn list_members(
    State(state): State<AppState>,
    auth: AuthUser,
    SnowflakePath(channel_id): SnowflakePath<Snowflake>,
    pagination: Pagination,
) -> ApiResult<Json<Vec<MemberResponse>>> {
    let service = MemberService::new(state.service_context());
    let members = service
        .list_members(channel_id, auth.user_id, pagination.after, pagination.limit)
        .await?;
    Ok(Json(members))
}

/// Add a user directly (owner, moderator, or `MANAGE_MEMBERS`)
///
/// POST /channels/{channel_id}/members
pub async fn add_member(
    State(state): State<AppState>,
    auth: AuthUser,
    SnowflakePath(channel_id): SnowflakePath<Snowflake>,
    JsonBody(request): JsonBody<AddMemberRequest>,
) -> ApiResult<Created<Json<MemberResponse>>> {
    let service = MemberService::new(state.service_context());
    let response = service
        .add_member(channel_id, auth.user_id, request)
        .await?;
    Ok(Created(Json(response)))
}

/// GET /channels/{channel_id}/members/{user_id}
pub async fn get_member(
    State(state): State<AppState>,
    auth: AuthUser,
    SnowflakePath((channel_id, user_id)): SnowflakePath<(Snowflake, Snowflake)>,
) -> ApiResult<Json<MemberResponse>> {
    let service = MemberService::new(state.service_context());
    let response = service.get_member(channel_id, auth.user_id, user_id).await?;
    Ok(Json(response))
}

/// Change role or permission flags
///
/// PATCH /channels/{channel_id}/members/{user_id}
pub async fn update_member(
    State(state): State<AppState>,
    auth: AuthUser,
    SnowflakePath((channel_id, user_id)): SnowflakePath<(Snowflake, Snowflake)>,
    JsonBody(request): JsonBody<UpdateMemberRequest>,
) -> ApiResult<Json<MemberResponse>> {
    let service = MemberService::new(state.service_context());
    let response = service
        .update_member(channel_id, auth.user_id, user_id, request)
        .await?;
    Ok(Json(response))
}

/// Kick a member
///
/// DELETE /channels/{channel_id}/members/{user_id}
pub async fn remove_member(
    State(state): State<AppState>,
    auth: AuthUser,
    SnowflakePath((channel_id, user_id)): SnowflakePath<(Snowflake, Snowflake)>,
) -> ApiResult<NoContent> {
    let service = MemberService::new(state.service_context());
    service
        .remove_member(channel_id, auth.user_id, user_id)
        .await?;
    Ok(NoContent)
}

/// Leave a channel
///
/// DELETE /channels/{channel_id}/members/@me
pub async fn leave_channel(
    State(state): State<AppState>,
    auth: AuthUser,
    SnowflakePath(channel_id): SnowflakePath<Snowflake>,
) -> ApiResult<NoContent> {
    let service = MemberService::new(state.service_context());
    service.leave_channel(channel_id, auth.user_id).await?;
    Ok(NoContent)
}

//! Channel handlers
//!
//! Channel CRUD, discovery, joining, ownership transfer and typing.

use axum::{extract::State, Json};
use dipcord_core::Snowflake;
use dipcord_service::{
    dto::{
        ChannelResponse, CreateChannelRequest, MemberResponse, TransferOwnershipRequest,
        UpdateChannelRequest,
    },
    ChannelService, MemberService, MessageService,
};

use crate::extractors::{AuthUser, JsonBody, Pagination, SnowflakePath, ValidatedJson};
use crate::response::{ApiResult, Created, NoContent};
use crate::state::AppState;

/// Create a channel owned by the caller
///
/// POST /channels
pub async fn create_channel(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(request): ValidatedJson<CreateChannelRequest>,
) -> ApiResult<Created<Json<ChannelResponse>>> {
    let service = ChannelService::new(state.service_context());
    let response = service.create_channel(auth.user_id, request).await?;
    Ok(Created(Json(response)))
}

/// Public channels, newest first
///
/// GET /channels/discover
pub async fn discover_channels(
    State(state): State<AppState>,
    _auth: AuthUser,
    pagination: Pagination,
) -> ApiResult<Json<Vec<ChannelResponse>>> {
    let service = ChannelService::new(state.service_context());
    let channels = service.discover_channels(pagination.into_query()).await?;
    Ok(Json(channels))
}

/// GET /channels/{channel_id}
pub async fn get_channel(
    State(state): State<AppState>,
    auth: AuthUser,
    SnowflakePath(channel_id): SnowflakePath<Snowflake>,
) -> ApiResult<Json<ChannelResponse>> {
    let service = ChannelService::new(state.service_context());
    let response = service.get_channel(channel_id, auth.user_id).await?;
    Ok(Json(response))
}

/// PATCH /channels/{channel_id}
pub async fn update_channel(
    State(state): State<AppState>,
    auth: AuthUser,
    SnowflakePath(channel_id): SnowflakePath<Snowflake>,
    ValidatedJson(request): ValidatedJson<UpdateChannelRequest>,
) -> ApiResult<Json<ChannelResponse>> {
    let service = ChannelService::new(state.service_context());
    let response = service
        .update_channel(channel_id, auth.user_id, request)
        .await?;
    Ok(Json(response))
}

/// Delete a channel and everything in it (owner only)
///
/// DELETE /channels/{channel_id}
pub async fn delete_channel(
    State(state): State<AppState>,
    auth: AuthUser,
    SnowflakePath(channel_id): SnowflakePath<Snowflake>,
) -> ApiResult<NoContent> {
    let service = ChannelService::new(state.service_context());
    service.delete_channel(channel_id, auth.user_id).await?;
    Ok(NoContent)
}

/// Join a public channel
///
/// POST /channels/{channel_id}/join
pub async fn join_channel(
    State(state): State<AppState>,
    auth: AuthUser,
    SnowflakePath(channel_id): SnowflakePath<Snowflake>,
) -> ApiResult<Created<Json<MemberResponse>>> {
    let service = ChannelService::new(state.service_context());
    let response = service.join_channel(channel_id, auth.user_id).await?;
    Ok(Created(Json(response)))
}

/// Hand ownership to another member
///
/// POST /channels/{channel_id}/transfer
pub async fn transfer_ownership(
    State(state): State<AppState>,
    auth: AuthUser,
    SnowflakePath(channel_id): SnowflakePath<Snowflake>,
    JsonBody(request): JsonBody<TransferOwnershipRequest>,
) -> ApiResult<Json<MemberResponse>> {
    let service = MemberService::new(state.service_context());
    let response = service
        .transfer_ownership(channel_id, auth.user_id, request)
        .await?;
    Ok(Json(response))
}

/// POST /channels/{channel_id}/typing
pub async fn start_typing(
    State(state): State<AppState>,
    auth: AuthUser,
    SnowflakePath(channel_id): SnowflakePath<Snowflake>,
) -> ApiResult<NoContent> {
    let service = MessageService::new(state.service_context());
    service.start_typing(channel_id, auth.user_id).await?;
    Ok(NoContent)
}

/// DELETE /channels/{channel_id}/typing
pub async fn stop_typing(
    State(state): State<AppState>,
    auth: AuthUser,
    SnowflakePath(channel_id): SnowflakePath<Snowflake>,
) -> ApiResult<NoContent> {
    let service = MessageService::new(state.service_context());
    service.stop_typing(channel_id, auth.user_id).await?;
    Ok(NoContent)
}

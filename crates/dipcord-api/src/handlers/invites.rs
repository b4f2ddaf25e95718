//! Invite handlers
//!
//! Single-use invite codes: create and list per channel, preview, accept, revoke.

use axum::{extract::State, Json};
use dipcord_core::Snowflake;
use dipcord_service::{
    dto::{ChannelResponse, CreateInviteRequest, InvitePreviewResponse, InviteResponse},
    InviteService,
};

use crate::extractors::{AuthUser, InviteCodePath, SnowflakePath, ValidatedJson};
use crate::response::{ApiResult, Created, NoContent};
use crate::state::AppState;

/// GET /channels/{channel_id}/invites
pub async fn list_channel_invites(
    State(state): State<AppState>,
    auth: AuthUser,
    SnowflakePath(channel_id): SnowflakePath<Snowflake>,
) -> ApiResult<Json<Vec<InviteResponse>>> {
    let service = InviteService::new(state.service_context());
    let invites = service.list_invites(channel_id, auth.user_id).await?;
    Ok(Json(invites))
}

/// POST /channels/{channel_id}/invites
pub async fn create_invite(
    State(state): State<AppState>,
    auth: AuthUser,
    SnowflakePath(channel_id): SnowflakePath<Snowflake>,
    ValidatedJson(request): ValidatedJson<CreateInviteRequest>,
) -> ApiResult<Created<Json<InviteResponse>>> {
    let service = InviteService::new(state.service_context());
    let response = service
        .create_invite(channel_id, auth.user_id, request)
        .await?;
    Ok(Created(Json(response)))
}

/// Preview the channel behind a code
///
/// GET /invites/{code}
pub async fn get_invite(
    State(state): State<AppState>,
    _auth: AuthUser,
    InviteCodePath(code): InviteCodePath,
) -> ApiResult<Json<InvitePreviewResponse>> {
    let service = InviteService::new(state.service_context());
    let response = service.get_invite(&code).await?;
    Ok(Json(response))
}

/// Redeem a code and join its channel
///
/// POST /invites/{code}/accept
pub async fn accept_invite(
    State(state): State<AppState>,
    auth: AuthUser,
    InviteCodePath(code): InviteCodePath,
) -> ApiResult<Json<ChannelResponse>> {
    let service = InviteService::new(state.service_context());
    let response = service.accept_invite(&code, auth.user_id).await?;
    Ok(Json(response))
}

/// DELETE /invites/{code}
pub async fn revoke_invite(
    State(state): State<AppState>,
    auth: AuthUser,
    InviteCodePath(code): InviteCodePath,
) -> ApiResult<NoContent> {
    let service = InviteService::new(state.service_context());
    service.revoke_invite(&code, auth.user_id).await?;
    Ok(NoContent)
}

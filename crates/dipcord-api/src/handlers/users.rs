//! User handlers
//!
//! Profile endpoints and the caller's channel list.

use axum::{extract::State, Json};
use dipcord_core::Snowflake;
use dipcord_service::{
    dto::{ChannelResponse, CurrentUserResponse, UpdateUserRequest, UserResponse},
    ChannelService, UserService,
};

use crate::extractors::{AuthUser, SnowflakePath, ValidatedJson};
use crate::response::ApiResult;
use crate::state::AppState;

/// Get current user
///
/// GET /users/@me
pub async fn get_current_user(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<CurrentUserResponse>> {
    let service = UserService::new(state.service_context());
    let response = service.get_current_user(auth.user_id).await?;
    Ok(Json(response))
}

/// Update name or surname of the current user
///
/// PATCH /users/@me
pub async fn update_current_user(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(request): ValidatedJson<UpdateUserRequest>,
) -> ApiResult<Json<CurrentUserResponse>> {
    let service = UserService::new(state.service_context());
    let response = service.update_current_user(auth.user_id, request).await?;
    Ok(Json(response))
}

/// Channels the caller belongs to
///
/// GET /users/@me/channels
pub async fn get_my_channels(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<Vec<ChannelResponse>>> {
    let service = ChannelService::new(state.service_context());
    let channels = service.list_my_channels(auth.user_id).await?;
    Ok(Json(channels))
}

/// Public profile
///
/// GET /users/{user_id}
pub async fn get_user(
    State(state): State<AppState>,
    _auth: AuthUser,
    SnowflakePath(user_id): SnowflakePath<Snowflake>,
) -> ApiResult<Json<UserResponse>> {
    let service = UserService::new(state.service_context());
    let response = service.get_user(user_id).await?;
    Ok(Json(response))
}

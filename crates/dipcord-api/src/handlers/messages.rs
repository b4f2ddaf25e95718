//! Message handlers
//!
//! Channel history, threads, edits, soft deletes and reactions.

use axum::{extract::State, Json};
use dipcord_core::Snowflake;
use dipcord_service::{
    dto::{
        CreateMessageRequest, MessageResponse, ReactionResponse, ReactionToggleResponse,
        ToggleReactionRequest, UpdateMessageRequest,
    },
    MessageService,
};

use crate::extractors::{AuthUser, Pagination, SnowflakePath, ValidatedJson};
use crate::response::{ApiResult, Created, NoContent};
use crate::state::AppState;

/// Top-level messages of a channel, newest first
///
/// GET /channels/{channel_id}/messages
pub async fn list_messages(
    State(state): State<AppState>,
    auth: AuthUser,
    SnowflakePath(channel_id): SnowflakePath<Snowflake>,
    pagination: Pagination,
) -> ApiResult<Json<Vec<MessageResponse>>> {
    let service = MessageService::new(state.service_context());
    let messages = service
        .list_messages(channel_id, auth.user_id, pagination.into_query())
        .await?;
    Ok(Json(messages))
}

/// Post a message or a thread reply
///
/// POST /channels/{channel_id}/messages
pub async fn create_message(
    State(state): State<AppState>,
    auth: AuthUser,
    SnowflakePath(channel_id): SnowflakePath<Snowflake>,
    ValidatedJson(request): ValidatedJson<CreateMessageRequest>,
) -> ApiResult<Created<Json<MessageResponse>>> {
    let service = MessageService::new(state.service_context());
    let response = service
        .create_message(channel_id, auth.user_id, request)
        .await?;
    Ok(Created(Json(response)))
}

/// GET /messages/{message_id}
pub async fn get_message(
    State(state): State<AppState>,
    auth: AuthUser,
    SnowflakePath(message_id): SnowflakePath<Snowflake>,
) -> ApiResult<Json<MessageResponse>> {
    let service = MessageService::new(state.service_context());
    let response = service.get_message(message_id, auth.user_id).await?;
    Ok(Json(response))
}

/// Edit own message
///
/// PATCH /messages/{message_id}
pub async fn edit_message(
    State(state): State<AppState>,
    auth: AuthUser,
    SnowflakePath(message_id): SnowflakePath<Snowflake>,
    ValidatedJson(request): ValidatedJson<UpdateMessageRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let service = MessageService::new(state.service_context());
    let response = service
        .edit_message(message_id, auth.user_id, request)
        .await?;
    Ok(Json(response))
}

/// Soft delete (author or `MANAGE_MESSAGES`)
///
/// DELETE /messages/{message_id}
pub async fn delete_message(
    State(state): State<AppState>,
    auth: AuthUser,
    SnowflakePath(message_id): SnowflakePath<Snowflake>,
) -> ApiResult<NoContent> {
    let service = MessageService::new(state.service_context());
    service.delete_message(message_id, auth.user_id).await?;
    Ok(NoContent)
}

/// Thread replies, oldest first
///
/// GET /messages/{message_id}/replies
pub async fn list_replies(
    State(state): State<AppState>,
    auth: AuthUser,
    SnowflakePath(message_id): SnowflakePath<Snowflake>,
    pagination: Pagination,
) -> ApiResult<Json<Vec<MessageResponse>>> {
    let service = MessageService::new(state.service_context());
    let replies = service
        .list_replies(message_id, auth.user_id, pagination.into_query())
        .await?;
    Ok(Json(replies))
}

/// Reaction counts per emoji
///
/// GET /messages/{message_id}/reactions
pub async fn list_reactions(
    State(state): State<AppState>,
    auth: AuthUser,
    SnowflakePath(message_id): SnowflakePath<Snowflake>,
) -> ApiResult<Json<Vec<ReactionResponse>>> {
    let service = MessageService::new(state.service_context());
    let reactions = service.list_reactions(message_id, auth.user_id).await?;
    Ok(Json(reactions))
}

/// Add the reaction, or remove it when the caller already reacted
///
/// POST /messages/{message_id}/reactions
pub async fn toggle_reaction(
    State(state): State<AppState>,
    auth: AuthUser,
    SnowflakePath(message_id): SnowflakePath<Snowflake>,
    ValidatedJson(request): ValidatedJson<ToggleReactionRequest>,
) -> ApiResult<Json<ReactionToggleResponse>> {
    let service = MessageService::new(state.service_context());
    let response = service
        .toggle_reaction(message_id, auth.user_id, request)
        .await?;
    Ok(Json(response))
}

//! Identify handler (op 2)

use std::sync::Arc;

use dipcord_core::DomainError;
use dipcord_service::{ServiceError, UserService};

use super::{HandlerError, HandlerResult};
use crate::connection::Connection;
use crate::protocol::{CloseCode, IdentifyPayload, ReadyPayload, READY_EVENT};
use crate::server::GatewayState;

pub struct IdentifyHandler;

impl IdentifyHandler {
    /// Authenticate the connection, subscribe it to the user's channels and send `ready`
    pub async fn handle(
        state: &GatewayState,
        connection: &Arc<Connection>,
        payload: IdentifyPayload,
    ) -> HandlerResult<Option<CloseCode>> {
        if connection.is_authenticated().await {
            tracing::warn!(
                session_id = %connection.session_id(),
                "Client sent Identify while already authenticated"
            );
            return Ok(Some(CloseCode::AlreadyAuthenticated));
        }

        let ctx = state.service_context();

        let claims = ctx
            .jwt_service()
            .validate_access_token(payload.bare_token())
            .map_err(|e| {
                tracing::debug!(error = %e, "Token validation failed");
                HandlerError::AuthenticationFailed(e.to_string())
            })?;
        let user_id = claims
            .user_id()
            .map_err(|e| HandlerError::AuthenticationFailed(e.to_string()))?;

        // A valid token for a deleted account is still a failed login
        let user = UserService::new(ctx)
            .get_current_user(user_id)
            .await
            .map_err(|e| match e {
                ServiceError::Domain(DomainError::UserNotFound(_)) => {
                    HandlerError::AuthenticationFailed("User not found".to_string())
                }
                other => HandlerError::Service(other),
            })?;

        let channel_ids = ctx.member_repo().channel_ids_for_user(user_id).await?;

        let session_id = connection.session_id().to_string();
        let dispatcher = state.event_dispatcher();
        dispatcher.attach_user(&session_id, user_id).await?;
        for channel_id in &channel_ids {
            dispatcher.attach_channel(&session_id, *channel_id).await?;
        }

        let ready = ReadyPayload {
            session_id: session_id.clone(),
            user,
            channel_ids,
        };
        let data = serde_json::to_value(&ready)
            .map_err(|e| HandlerError::InvalidPayload(e.to_string()))?;
        connection
            .dispatch(READY_EVENT, data)
            .await
            .map_err(|_| HandlerError::ConnectionClosed)?;

        tracing::info!(
            session_id = %session_id,
            user_id = %user_id,
            channels = ready.channel_ids.len(),
            "Client identified"
        );

        Ok(None)
    }
}

//! Typing handler (op 5)

use std::sync::Arc;

use dipcord_service::MessageService;

use super::HandlerResult;
use crate::connection::Connection;
use crate::protocol::{CloseCode, TypingPayload};
use crate::server::GatewayState;

pub struct TypingHandler;

impl TypingHandler {
    /// Publish `typing:start` or `typing:stop` for a channel the user belongs to
    pub async fn handle(
        state: &GatewayState,
        connection: &Arc<Connection>,
        payload: TypingPayload,
    ) -> HandlerResult<Option<CloseCode>> {
        let Some(user_id) = connection.user_id().await else {
            return Ok(Some(CloseCode::NotAuthenticated));
        };

        let service = MessageService::new(state.service_context());
        let result = if payload.typing {
            service.start_typing(payload.channel_id, user_id).await
        } else {
            service.stop_typing(payload.channel_id, user_id).await
        };

        // Typing is advisory; a rejected indicator never costs the connection
        if let Err(e) = result {
            tracing::warn!(
                session_id = %connection.session_id(),
                channel_id = %payload.channel_id,
                error = %e,
                "Typing indicator rejected"
            );
        }

        Ok(None)
    }
}

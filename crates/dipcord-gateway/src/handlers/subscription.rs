//! Subscribe / Unsubscribe handlers (ops 3 and 4)

use std::sync::Arc;

use dipcord_service::PermissionService;

use super::{HandlerError, HandlerResult};
use crate::connection::Connection;
use crate::protocol::{ChannelPayload, CloseCode};
use crate::server::GatewayState;

pub struct SubscriptionHandler;

impl SubscriptionHandler {
    /// Follow a channel the user is a member of; other channels are ignored
    pub async fn subscribe(
        state: &GatewayState,
        connection: &Arc<Connection>,
        payload: ChannelPayload,
    ) -> HandlerResult<Option<CloseCode>> {
        let Some(user_id) = connection.user_id().await else {
            return Ok(Some(CloseCode::NotAuthenticated));
        };
        let channel_id = payload.channel_id;

        let is_member = PermissionService::new(state.service_context())
            .is_member(channel_id, user_id)
            .await
            .map_err(HandlerError::Service)?;

        if !is_member {
            tracing::warn!(
                session_id = %connection.session_id(),
                user_id = %user_id,
                channel_id = %channel_id,
                "Subscribe to a channel the user is not a member of, ignoring"
            );
            return Ok(None);
        }

        state
            .event_dispatcher()
            .attach_channel(connection.session_id(), channel_id)
            .await?;
        Ok(None)
    }

    pub async fn unsubscribe(
        state: &GatewayState,
        connection: &Arc<Connection>,
        payload: ChannelPayload,
    ) -> HandlerResult<Option<CloseCode>> {
        state
            .event_dispatcher()
            .detach_channel(connection.session_id(), payload.channel_id)
            .await?;
        Ok(None)
    }
}

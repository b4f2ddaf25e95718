//! Op code handlers
//!
//! Handles incoming WebSocket messages based on their operation code.

mod error;
mod heartbeat;
mod identify;
mod subscription;
mod typing;

pub use error::{HandlerError, HandlerResult};
pub use heartbeat::HeartbeatHandler;
pub use identify::IdentifyHandler;
pub use subscription::SubscriptionHandler;
pub use typing::TypingHandler;

use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::connection::Connection;
use crate::protocol::{CloseCode, GatewayMessage, OpCode};
use crate::server::GatewayState;

/// Dispatch incoming client messages to appropriate handlers
pub struct MessageDispatcher;

impl MessageDispatcher {
    /// Handle one client frame. `Some(code)` means close the socket with it.
    pub async fn dispatch(
        state: &GatewayState,
        connection: &Arc<Connection>,
        message: GatewayMessage,
    ) -> HandlerResult<Option<CloseCode>> {
        if !message.op.is_client_op() {
            tracing::warn!(
                session_id = %connection.session_id(),
                op = %message.op,
                "Received server-only op code from client"
            );
            return Ok(Some(CloseCode::UnknownOpcode));
        }

        if !message.op.allowed_before_identify() && !connection.is_authenticated().await {
            tracing::debug!(
                session_id = %connection.session_id(),
                op = %message.op,
                "Op sent before Identify"
            );
            return Ok(Some(CloseCode::NotAuthenticated));
        }

        match message.op {
            OpCode::Heartbeat => HeartbeatHandler::handle(connection).await,
            OpCode::Identify => {
                IdentifyHandler::handle(state, connection, payload(&message)?).await
            }
            OpCode::Subscribe => {
                SubscriptionHandler::subscribe(state, connection, payload(&message)?).await
            }
            OpCode::Unsubscribe => {
                SubscriptionHandler::unsubscribe(state, connection, payload(&message)?).await
            }
            OpCode::Typing => TypingHandler::handle(state, connection, payload(&message)?).await,
            // Server-only ops were rejected above
            OpCode::Dispatch | OpCode::InvalidSession | OpCode::Hello | OpCode::HeartbeatAck => {
                Ok(Some(CloseCode::UnknownOpcode))
            }
        }
    }
}

fn payload<T: DeserializeOwned>(message: &GatewayMessage) -> HandlerResult<T> {
    message
        .payload()
        .ok_or_else(|| HandlerError::InvalidPayload(format!("Invalid {} payload", message.op.name())))
}

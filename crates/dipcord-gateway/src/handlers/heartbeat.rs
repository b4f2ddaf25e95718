//! Heartbeat handler (op 1)

use std::sync::Arc;

use super::{HandlerError, HandlerResult};
use crate::connection::Connection;
use crate::protocol::{CloseCode, GatewayMessage};

pub struct HeartbeatHandler;

impl HeartbeatHandler {
    /// Reset the idle timer and answer with op 11
    pub async fn handle(connection: &Arc<Connection>) -> HandlerResult<Option<CloseCode>> {
        connection.record_heartbeat().await;

        tracing::trace!(
            session_id = %connection.session_id(),
            server_seq = connection.current_sequence(),
            "Heartbeat received"
        );

        connection
            .send(GatewayMessage::heartbeat_ack())
            .await
            .map_err(|_| HandlerError::ConnectionClosed)?;

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::Outbound;
    use crate::protocol::OpCode;
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn test_heartbeat_is_acked() {
        let (tx, mut rx) = mpsc::channel(4);
        let conn = Connection::new("s".to_string(), tx);

        assert!(HeartbeatHandler::handle(&conn).await.unwrap().is_none());
        assert!(matches!(
            rx.recv().await,
            Some(Outbound::Frame(msg)) if msg.op == OpCode::HeartbeatAck
        ));
    }

    #[tokio::test]
    async fn test_closed_writer_is_an_error() {
        let (tx, rx) = mpsc::channel(4);
        let conn = Connection::new("s".to_string(), tx);
        drop(rx);

        assert!(matches!(
            HeartbeatHandler::handle(&conn).await,
            Err(HandlerError::ConnectionClosed)
        ));
    }
}

//! WebSocket handler
//!
//! One reader task, one writer task and one heartbeat watchdog per socket.
//! Whichever finishes first ends the connection.

use std::borrow::Cow;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{
        ws::{CloseFrame, Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::time::interval;

use crate::connection::{Connection, Outbound};
use crate::handlers::MessageDispatcher;
use crate::protocol::{CloseCode, GatewayMessage, HelloPayload};
use crate::server::GatewayState;

/// Channel buffer size for outgoing messages
const MESSAGE_BUFFER_SIZE: usize = 100;

/// How long the writer gets to flush a close frame
const CLOSE_GRACE: Duration = Duration::from_secs(1);

pub async fn gateway_handler(
    State(state): State<GatewayState>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(state, socket))
}

async fn handle_socket(state: GatewayState, socket: WebSocket) {
    let session_id = uuid::Uuid::new_v4().to_string();
    let heartbeat_interval = state.config().gateway.heartbeat_interval_ms;
    let heartbeat_timeout = Duration::from_millis(state.config().gateway.heartbeat_timeout_ms);

    let (tx, mut rx) = mpsc::channel::<Outbound>(MESSAGE_BUFFER_SIZE);
    let connection = state
        .connection_manager()
        .add_connection(session_id.clone(), tx);

    tracing::info!(session_id = %session_id, "WebSocket connection established");

    let (mut ws_sink, mut ws_stream) = socket.split();

    // Hello goes out before the writer task exists so it is always first
    if let Ok(json) = GatewayMessage::hello(HelloPayload::with_interval(heartbeat_interval)).to_json() {
        if ws_sink.send(Message::Text(json)).await.is_err() {
            tracing::warn!(session_id = %session_id, "Failed to send Hello message");
            cleanup_connection(&state, &session_id).await;
            return;
        }
    }

    let state_recv = state.clone();
    let connection_recv = connection.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = ws_stream.next().await {
            let session_id = connection_recv.session_id();
            match msg {
                Ok(Message::Text(text)) => {
                    if let Err(close_code) =
                        handle_text_message(&state_recv, &connection_recv, &text).await
                    {
                        return Some(close_code);
                    }
                }
                Ok(Message::Binary(_)) => {
                    tracing::debug!(session_id = %session_id, "Binary messages not supported");
                    return Some(CloseCode::DecodeError);
                }
                Ok(Message::Ping(_) | Message::Pong(_)) => {
                    // axum answers pings itself
                }
                Ok(Message::Close(_)) => {
                    tracing::info!(session_id = %session_id, "Client closed connection");
                    return None;
                }
                Err(e) => {
                    tracing::warn!(session_id = %session_id, error = %e, "WebSocket error");
                    return None;
                }
            }
        }
        None
    });

    let session_id_send = session_id.clone();
    let mut send_task = tokio::spawn(async move {
        while let Some(outbound) = rx.recv().await {
            match outbound {
                Outbound::Frame(msg) => {
                    let Ok(json) = msg.to_json() else {
                        continue;
                    };
                    if ws_sink.send(Message::Text(json)).await.is_err() {
                        tracing::warn!(session_id = %session_id_send, "Failed to send message to WebSocket");
                        break;
                    }
                }
                Outbound::Close(code) => {
                    let frame = CloseFrame {
                        code: code.as_u16(),
                        reason: Cow::Borrowed(code.description()),
                    };
                    ws_sink.send(Message::Close(Some(frame))).await.ok();
                    break;
                }
            }
        }

        ws_sink.close().await.ok();
    });

    let connection_hb = connection.clone();
    let mut heartbeat_task = tokio::spawn(async move {
        let mut check_interval = interval((heartbeat_timeout / 4).max(Duration::from_millis(10)));

        loop {
            check_interval.tick().await;

            let time_since = connection_hb.time_since_heartbeat().await;
            if time_since > heartbeat_timeout {
                tracing::warn!(
                    session_id = %connection_hb.session_id(),
                    time_since_ms = time_since.as_millis(),
                    "Connection timed out (no heartbeat)"
                );
                return CloseCode::SessionTimeout;
            }
        }
    });

    let close_code = tokio::select! {
        result = &mut recv_task => result.ok().flatten(),
        _ = &mut send_task => None,
        result = &mut heartbeat_task => result.ok(),
    };

    recv_task.abort();
    heartbeat_task.abort();

    if let Some(code) = close_code {
        tracing::debug!(session_id = %session_id, close_code = %code, "Closing connection");
        connection.close(code).await;
        if tokio::time::timeout(CLOSE_GRACE, &mut send_task).await.is_err() {
            send_task.abort();
        }
    } else {
        send_task.abort();
    }

    cleanup_connection(&state, &session_id).await;
}

/// Parse and route one text frame; `Err` carries the close code to send
async fn handle_text_message(
    state: &GatewayState,
    connection: &Arc<Connection>,
    text: &str,
) -> Result<(), CloseCode> {
    let message = GatewayMessage::parse(text).map_err(|code| {
        tracing::debug!(session_id = %connection.session_id(), close_code = %code, "Rejected frame");
        code
    })?;

    tracing::trace!(session_id = %connection.session_id(), op = %message.op, "Received message");

    match MessageDispatcher::dispatch(state, connection, message).await {
        Ok(Some(close_code)) => Err(close_code),
        Ok(None) => Ok(()),
        Err(e) => {
            tracing::warn!(session_id = %connection.session_id(), error = %e, "Handler error");
            Err(e.to_close_code())
        }
    }
}

async fn cleanup_connection(state: &GatewayState, session_id: &str) {
    tracing::info!(session_id = %session_id, "Cleaning up connection");

    if let Err(e) = state.event_dispatcher().release(session_id).await {
        tracing::warn!(session_id = %session_id, error = %e, "Failed to release subscriptions");
    }
}

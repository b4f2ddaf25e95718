//! Individual WebSocket connection

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use dipcord_core::Snowflake;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::{mpsc, RwLock};

use crate::protocol::{CloseCode, GatewayMessage};

/// Connection state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionState {
    /// Connection established, waiting for Identify
    Connecting,
    /// Successfully authenticated
    Connected,
    /// Connection is closed
    Disconnected,
}

/// What the socket writer should do next
#[derive(Debug, Clone)]
pub enum Outbound {
    Frame(GatewayMessage),
    Close(CloseCode),
}

/// A single WebSocket connection
pub struct Connection {
    session_id: String,

    /// Authenticated user ID (None until Identify)
    user_id: RwLock<Option<Snowflake>>,

    state: RwLock<ConnectionState>,

    /// Feeds the task that owns the socket sink
    sender: mpsc::Sender<Outbound>,

    /// Last sequence number sent
    sequence: AtomicU64,

    /// Last heartbeat received
    last_heartbeat: RwLock<Instant>,

    /// Chat channels this connection receives events for
    channels: RwLock<HashSet<Snowflake>>,

    created_at: Instant,
}

impl Connection {
    pub fn new(session_id: String, sender: mpsc::Sender<Outbound>) -> Arc<Self> {
        Arc::new(Self {
            session_id,
            user_id: RwLock::new(None),
            state: RwLock::new(ConnectionState::Connecting),
            sender,
            sequence: AtomicU64::new(0),
            last_heartbeat: RwLock::new(Instant::now()),
            channels: RwLock::new(HashSet::new()),
            created_at: Instant::now(),
        })
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub async fn user_id(&self) -> Option<Snowflake> {
        *self.user_id.read().await
    }

    pub async fn set_user_id(&self, user_id: Snowflake) {
        *self.user_id.write().await = Some(user_id);
    }

    pub async fn state(&self) -> ConnectionState {
        *self.state.read().await
    }

    pub async fn set_state(&self, state: ConnectionState) {
        *self.state.write().await = state;
    }

    pub async fn is_authenticated(&self) -> bool {
        self.user_id.read().await.is_some()
    }

    /// Get the next sequence number
    pub fn next_sequence(&self) -> u64 {
        self.sequence.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn current_sequence(&self) -> u64 {
        self.sequence.load(Ordering::SeqCst)
    }

    pub async fn record_heartbeat(&self) {
        *self.last_heartbeat.write().await = Instant::now();
    }

    pub async fn time_since_heartbeat(&self) -> Duration {
        self.last_heartbeat.read().await.elapsed()
    }

    /// Returns `true` if the channel was newly added
    pub async fn add_channel(&self, channel_id: Snowflake) -> bool {
        self.channels.write().await.insert(channel_id)
    }

    /// Returns `true` if the channel was present
    pub async fn remove_channel(&self, channel_id: Snowflake) -> bool {
        self.channels.write().await.remove(&channel_id)
    }

    pub async fn channels(&self) -> Vec<Snowflake> {
        self.channels.read().await.iter().copied().collect()
    }

    pub async fn is_subscribed_to(&self, channel_id: Snowflake) -> bool {
        self.channels.read().await.contains(&channel_id)
    }

    pub fn age(&self) -> Duration {
        self.created_at.elapsed()
    }

    /// Queue a frame for the socket
    pub async fn send(&self, message: GatewayMessage) -> Result<(), mpsc::error::SendError<Outbound>> {
        self.sender.send(Outbound::Frame(message)).await
    }

    /// Queue a dispatch stamped with this connection's next sequence number
    pub async fn dispatch(
        &self,
        event_type: &str,
        data: Value,
    ) -> Result<(), mpsc::error::SendError<Outbound>> {
        let seq = self.next_sequence();
        self.send(GatewayMessage::dispatch(event_type, seq, data)).await
    }

    /// Ask the writer to send a close frame and stop
    pub async fn close(&self, code: CloseCode) {
        if self.sender.send(Outbound::Close(code)).await.is_err() {
            tracing::trace!(session_id = %self.session_id, "Writer already gone");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("session_id", &self.session_id)
            .field("sequence", &self.sequence.load(Ordering::SeqCst))
            .field("created_at", &self.created_at)
            .finish()
    }
}

//! Connection manager
//!
//! Tracks every live WebSocket connection, indexed by session, by user and by
//! chat channel, using DashMap for thread-safe access.

use std::collections::HashSet;
use std::sync::Arc;

use dashmap::DashMap;
use dipcord_core::Snowflake;
use serde_json::Value;
use tokio::sync::mpsc;

use super::{Connection, ConnectionState, Outbound};

/// What a connection was attached to when it was removed
#[derive(Debug, Default)]
pub struct Released {
    pub user_id: Option<Snowflake>,
    /// Channels with no local subscribers left
    pub orphaned_channels: Vec<Snowflake>,
    /// Whether that was the user's last connection
    pub user_orphaned: bool,
}

pub struct ConnectionManager {
    /// Active connections by session ID
    connections: DashMap<String, Arc<Connection>>,

    /// User ID to session IDs mapping
    user_connections: DashMap<Snowflake, HashSet<String>>,

    /// Channel ID to session IDs mapping
    channel_connections: DashMap<Snowflake, HashSet<String>>,
}

impl ConnectionManager {
    #[must_use]
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
            user_connections: DashMap::new(),
            channel_connections: DashMap::new(),
        }
    }

    #[must_use]
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Register a new connection
    pub fn add_connection(&self, session_id: String, sender: mpsc::Sender<Outbound>) -> Arc<Connection> {
        let connection = Connection::new(session_id.clone(), sender);
        self.connections.insert(session_id.clone(), connection.clone());

        tracing::debug!(session_id = %session_id, "Connection added");

        connection
    }

    /// Remove a connection and report which subscriptions it was the last holder of
    ///
    /// Uses `remove_if` so that checking for emptiness and removing the entry
    /// happen under the same shard lock.
    pub async fn remove_connection(&self, session_id: &str) -> Released {
        let Some((_, connection)) = self.connections.remove(session_id) else {
            return Released::default();
        };

        connection.set_state(ConnectionState::Disconnected).await;
        let mut released = Released::default();

        if let Some(user_id) = connection.user_id().await {
            released.user_id = Some(user_id);
            if let Some(mut sessions) = self.user_connections.get_mut(&user_id) {
                sessions.remove(session_id);
            }
            released.user_orphaned = self
                .user_connections
                .remove_if(&user_id, |_, sessions| sessions.is_empty())
                .is_some();
        }

        for channel_id in connection.channels().await {
            if self.detach(session_id, channel_id) {
                released.orphaned_channels.push(channel_id);
            }
        }

        tracing::debug!(session_id = %session_id, "Connection removed");
        released
    }

    /// Drop `session_id` from a channel's index; `true` if nobody is left
    fn detach(&self, session_id: &str, channel_id: Snowflake) -> bool {
        if let Some(mut sessions) = self.channel_connections.get_mut(&channel_id) {
            sessions.remove(session_id);
        }
        self.channel_connections
            .remove_if(&channel_id, |_, sessions| sessions.is_empty())
            .is_some()
    }

    pub fn get_connection(&self, session_id: &str) -> Option<Arc<Connection>> {
        self.connections.get(session_id).map(|r| r.value().clone())
    }

    /// Link a connection to its user. Returns `true` for the user's first connection.
    pub async fn authenticate_connection(&self, session_id: &str, user_id: Snowflake) -> bool {
        let Some(connection) = self.get_connection(session_id) else {
            return false;
        };

        connection.set_user_id(user_id).await;
        connection.set_state(ConnectionState::Connected).await;

        let mut sessions = self.user_connections.entry(user_id).or_default();
        let first = sessions.is_empty();
        sessions.insert(session_id.to_string());

        tracing::debug!(session_id = %session_id, user_id = %user_id, "Connection authenticated");
        first
    }

    /// Returns `true` when this is the channel's first local subscriber
    pub async fn subscribe_to_channel(&self, session_id: &str, channel_id: Snowflake) -> bool {
        let Some(connection) = self.get_connection(session_id) else {
            return false;
        };
        if !connection.add_channel(channel_id).await {
            return false;
        }

        let mut sessions = self.channel_connections.entry(channel_id).or_default();
        let first = sessions.is_empty();
        sessions.insert(session_id.to_string());

        tracing::trace!(session_id = %session_id, channel_id = %channel_id, "Subscribed to channel");
        first
    }

    /// Returns `true` when the channel has no local subscribers afterwards
    pub async fn unsubscribe_from_channel(&self, session_id: &str, channel_id: Snowflake) -> bool {
        let Some(connection) = self.get_connection(session_id) else {
            return false;
        };
        if !connection.remove_channel(channel_id).await {
            return false;
        }

        tracing::trace!(session_id = %session_id, channel_id = %channel_id, "Unsubscribed from channel");
        self.detach(session_id, channel_id)
    }

    /// Detach every connection from a channel, e.g. after it was deleted
    pub async fn clear_channel(&self, channel_id: Snowflake) -> usize {
        let Some((_, sessions)) = self.channel_connections.remove(&channel_id) else {
            return 0;
        };

        for session_id in &sessions {
            if let Some(connection) = self.get_connection(session_id) {
                connection.remove_channel(channel_id).await;
            }
        }
        sessions.len()
    }

    pub fn get_user_connections(&self, user_id: Snowflake) -> Vec<Arc<Connection>> {
        self.sessions_to_connections(self.user_connections.get(&user_id).map(|s| s.value().clone()))
    }

    pub fn get_channel_connections(&self, channel_id: Snowflake) -> Vec<Arc<Connection>> {
        self.sessions_to_connections(self.channel_connections.get(&channel_id).map(|s| s.value().clone()))
    }

    // Clone the session set first so no shard lock is held across lookups
    fn sessions_to_connections(&self, sessions: Option<HashSet<String>>) -> Vec<Arc<Connection>> {
        sessions
            .map(|sessions| {
                sessions
                    .iter()
                    .filter_map(|sid| self.get_connection(sid))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Dispatch an event to every connection of a user
    pub async fn send_to_user(&self, user_id: Snowflake, event_type: &str, data: &Value) -> usize {
        let sent = dispatch_all(self.get_user_connections(user_id), event_type, data, None).await;
        tracing::trace!(user_id = %user_id, sent, "Event sent to user connections");
        sent
    }

    /// Dispatch an event to every connection subscribed to a channel
    pub async fn send_to_channel(
        &self,
        channel_id: Snowflake,
        event_type: &str,
        data: &Value,
        exclude_user: Option<Snowflake>,
    ) -> usize {
        let connections = self.get_channel_connections(channel_id);
        let sent = dispatch_all(connections, event_type, data, exclude_user).await;
        tracing::trace!(channel_id = %channel_id, sent, "Event sent to channel connections");
        sent
    }

    /// Dispatch an event to every authenticated connection
    pub async fn broadcast(&self, event_type: &str, data: &Value) -> usize {
        let connections: Vec<Arc<Connection>> =
            self.connections.iter().map(|r| r.value().clone()).collect();

        let mut sent = 0;
        for conn in connections {
            if conn.is_authenticated().await && conn.dispatch(event_type, data.clone()).await.is_ok() {
                sent += 1;
            }
        }

        tracing::debug!(sent, "Event broadcast to all connections");
        sent
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Number of distinct authenticated users
    pub fn user_count(&self) -> usize {
        self.user_connections.len()
    }

    /// Number of channels with at least one local subscriber
    pub fn channel_count(&self) -> usize {
        self.channel_connections.len()
    }

    pub fn has_session(&self, session_id: &str) -> bool {
        self.connections.contains_key(session_id)
    }
}

async fn dispatch_all(
    connections: Vec<Arc<Connection>>,
    event_type: &str,
    data: &Value,
    exclude_user: Option<Snowflake>,
) -> usize {
    let mut sent = 0;
    for conn in connections {
        if exclude_user.is_some() && conn.user_id().await == exclude_user {
            continue;
        }
        if conn.dispatch(event_type, data.clone()).await.is_ok() {
            sent += 1;
        }
    }
    sent
}

impl Default for ConnectionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ConnectionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("connections", &self.connections.len())
            .field("users", &self.user_connections.len())
            .field("channels", &self.channel_connections.len())
            .finish()
    }
}

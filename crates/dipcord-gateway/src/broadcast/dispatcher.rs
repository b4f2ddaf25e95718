//! Event dispatcher
//!
//! Receives events from Redis Pub/Sub and dispatches them to WebSocket
//! connections. The process only listens on `channel:{id}` and `user:{id}`
//! while at least one local connection needs them.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use dipcord_cache::{
    PubSubChannel, PubSubEvent, ReceivedMessage, Subscriber, SubscriberBuilder, SubscriberError,
};
use dipcord_core::{RealtimeEvent, Snowflake};
use tokio::sync::broadcast;

use crate::connection::ConnectionManager;

#[derive(Debug, Clone)]
pub struct EventDispatcherConfig {
    pub redis_url: String,
    /// Broadcast buffer size
    pub broadcast_buffer: usize,
    /// Reconnection delay in milliseconds
    pub reconnect_delay_ms: u64,
}

impl Default for EventDispatcherConfig {
    fn default() -> Self {
        Self {
            redis_url: "redis://127.0.0.1:6379".to_string(),
            broadcast_buffer: 1024,
            reconnect_delay_ms: 1000,
        }
    }
}

/// Routes Redis Pub/Sub messages to WebSocket connections
pub struct EventDispatcher {
    connection_manager: Arc<ConnectionManager>,
    subscriber: Subscriber,
    running: Arc<AtomicBool>,
}

impl EventDispatcher {
    pub async fn new(
        config: EventDispatcherConfig,
        connection_manager: Arc<ConnectionManager>,
    ) -> Result<Self, SubscriberError> {
        let subscriber = SubscriberBuilder::new()
            .redis_url(&config.redis_url)
            .broadcast_buffer(config.broadcast_buffer)
            .reconnect_delay_ms(config.reconnect_delay_ms)
            .subscribe(PubSubChannel::Broadcast)
            .build()
            .await?;

        Ok(Self {
            connection_manager,
            subscriber,
            running: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn connection_manager(&self) -> &ConnectionManager {
        &self.connection_manager
    }

    // ========================================================================
    // Subscriptions
    // ========================================================================

    /// Route `user:{id}` events to this process once the user has a connection here
    pub async fn attach_user(&self, session_id: &str, user_id: Snowflake) -> Result<(), SubscriberError> {
        if self
            .connection_manager
            .authenticate_connection(session_id, user_id)
            .await
        {
            self.subscriber.subscribe(&[PubSubChannel::user(user_id)]).await?;
        }
        Ok(())
    }

    /// Start delivering a channel's events to one connection
    pub async fn attach_channel(
        &self,
        session_id: &str,
        channel_id: Snowflake,
    ) -> Result<(), SubscriberError> {
        if self
            .connection_manager
            .subscribe_to_channel(session_id, channel_id)
            .await
        {
            self.subscriber
                .subscribe(&[PubSubChannel::channel(channel_id)])
                .await?;
        }
        Ok(())
    }

    /// Stop delivering a channel's events to one connection
    pub async fn detach_channel(
        &self,
        session_id: &str,
        channel_id: Snowflake,
    ) -> Result<(), SubscriberError> {
        if self
            .connection_manager
            .unsubscribe_from_channel(session_id, channel_id)
            .await
        {
            self.subscriber
                .unsubscribe(&[PubSubChannel::channel(channel_id)])
                .await?;
        }
        Ok(())
    }

    /// Forget a closed connection and drop Redis subscriptions nobody needs
    pub async fn release(&self, session_id: &str) -> Result<(), SubscriberError> {
        let released = self.connection_manager.remove_connection(session_id).await;

        let mut channels: Vec<PubSubChannel> = released
            .orphaned_channels
            .into_iter()
            .map(PubSubChannel::channel)
            .collect();
        if let (true, Some(user_id)) = (released.user_orphaned, released.user_id) {
            channels.push(PubSubChannel::user(user_id));
        }

        self.subscriber.unsubscribe(&channels).await
    }

    /// Channels the Redis listener has been asked to follow
    pub async fn subscribed_channels(&self) -> Vec<String> {
        self.subscriber.subscribed_channels().await
    }

    // ========================================================================
    // Event loop
    // ========================================================================

    /// Spawn the background task that forwards Redis messages to connections
    pub fn start(self: Arc<Self>) {
        if self.running.swap(true, Ordering::SeqCst) {
            tracing::warn!("Event dispatcher is already running");
            return;
        }

        let dispatcher = self.clone();
        tokio::spawn(async move {
            dispatcher.run().await;
        });

        tracing::info!("Event dispatcher started");
    }

    pub async fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
        self.subscriber.shutdown().await.ok();
        tracing::info!("Event dispatcher stopped");
    }

    async fn run(&self) {
        let mut receiver = self.subscriber.receiver();

        while self.running.load(Ordering::SeqCst) {
            match receiver.recv().await {
                Ok(msg) => self.handle_message(msg).await,
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(lagged = n, "Event dispatcher lagged behind");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::warn!("Event dispatcher channel closed");
                    break;
                }
            }
        }

        self.running.store(false, Ordering::SeqCst);
        tracing::info!("Event dispatcher loop ended");
    }

    /// Forward one message and apply its membership side effects
    pub(crate) async fn handle_message(&self, msg: ReceivedMessage) {
        let Some(event) = &msg.event else {
            tracing::debug!(channel = %msg.channel, "Received non-event message, ignoring");
            return;
        };

        tracing::trace!(channel = %msg.channel, event_type = %event.event_type, "Dispatching event");

        let typed = event.to_realtime();

        // A new member's sockets have to be listening before the event lands
        if let Some(RealtimeEvent::ChannelJoined { user_id, channel_id }) = &typed {
            self.attach_user_connections(*user_id, *channel_id).await;
        }

        self.forward(&msg.channel, event, typed.as_ref()).await;

        match typed {
            Some(RealtimeEvent::ChannelDeleted { channel_id }) => {
                let detached = self.connection_manager.clear_channel(channel_id).await;
                if let Err(e) = self
                    .subscriber
                    .unsubscribe(&[PubSubChannel::channel(channel_id)])
                    .await
                {
                    tracing::warn!(channel_id = %channel_id, error = %e, "Failed to drop channel subscription");
                }
                tracing::debug!(channel_id = %channel_id, detached, "Channel deleted, connections detached");
            }
            Some(RealtimeEvent::MemberRemoved { channel_id, user_id }) => {
                self.detach_user_connections(user_id, channel_id).await;
            }
            _ => {}
        }
    }

    async fn forward(&self, channel: &PubSubChannel, event: &PubSubEvent, typed: Option<&RealtimeEvent>) {
        let event_type = event.event_type.as_str();

        let sent = match channel {
            PubSubChannel::Channel(channel_id) => {
                // Typists already know they are typing
                let exclude_user = match typed {
                    Some(
                        RealtimeEvent::TypingStart { user_id, .. }
                        | RealtimeEvent::TypingStop { user_id, .. },
                    ) => Some(*user_id),
                    _ => None,
                };
                self.connection_manager
                    .send_to_channel(*channel_id, event_type, &event.data, exclude_user)
                    .await
            }
            PubSubChannel::User(user_id) => {
                self.connection_manager
                    .send_to_user(*user_id, event_type, &event.data)
                    .await
            }
            PubSubChannel::Broadcast => self.connection_manager.broadcast(event_type, &event.data).await,
        };

        tracing::trace!(channel = %channel, event_type = %event_type, sent, "Event dispatched");
    }

    async fn attach_user_connections(&self, user_id: Snowflake, channel_id: Snowflake) {
        for conn in self.connection_manager.get_user_connections(user_id) {
            if let Err(e) = self.attach_channel(conn.session_id(), channel_id).await {
                tracing::warn!(user_id = %user_id, channel_id = %channel_id, error = %e, "Failed to subscribe joined channel");
            }
        }
    }

    async fn detach_user_connections(&self, user_id: Snowflake, channel_id: Snowflake) {
        for conn in self.connection_manager.get_user_connections(user_id) {
            if let Err(e) = self.detach_channel(conn.session_id(), channel_id).await {
                tracing::warn!(user_id = %user_id, channel_id = %channel_id, error = %e, "Failed to unsubscribe removed member");
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

impl Drop for EventDispatcher {
    fn drop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
    }
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("connection_manager", &self.connection_manager)
            .field("running", &self.is_running())
            .finish()
    }
}

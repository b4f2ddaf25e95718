//! Redis Pub/Sub subscriber.
//!
//! A background task owns the Redis pubsub connection. Callers steer it with
//! subscribe/unsubscribe commands and read messages from a broadcast channel.
//! When the connection drops, the task waits `reconnect_delay_ms` and
//! re-subscribes to everything it was listening to.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use redis::Client;
use tokio::sync::{broadcast, mpsc, RwLock};

use crate::pubsub::{PubSubChannel, PubSubEvent};

#[derive(Debug, thiserror::Error)]
pub enum SubscriberError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Subscriber task is gone")]
    ChannelClosed,
}

pub type SubscriberResult<T> = Result<T, SubscriberError>;

/// One message as received from Redis
#[derive(Debug, Clone)]
pub struct ReceivedMessage {
    pub channel: PubSubChannel,
    /// `None` if the payload was not a valid envelope
    pub event: Option<PubSubEvent>,
}

impl ReceivedMessage {
    /// `None` for channel names outside our naming scheme
    fn from_redis(channel_name: &str, payload: &str) -> Option<Self> {
        let channel = PubSubChannel::parse(channel_name)?;
        Some(Self {
            channel,
            event: serde_json::from_str(payload).ok(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct SubscriberConfig {
    pub redis_url: String,
    /// Capacity of the broadcast channel handed to receivers
    pub broadcast_buffer: usize,
    pub reconnect_delay_ms: u64,
}

impl Default for SubscriberConfig {
    fn default() -> Self {
        Self {
            redis_url: "redis://127.0.0.1:6379".to_string(),
            broadcast_buffer: 1024,
            reconnect_delay_ms: 1000,
        }
    }
}

#[derive(Debug)]
enum SubscriberCommand {
    Subscribe(Vec<String>),
    Unsubscribe(Vec<String>),
    Shutdown,
}

/// Handle to the background listener
#[derive(Clone)]
pub struct Subscriber {
    subscribed: Arc<RwLock<HashSet<String>>>,
    broadcast_tx: broadcast::Sender<ReceivedMessage>,
    control_tx: mpsc::Sender<SubscriberCommand>,
}

impl Subscriber {
    /// Spawn the listener task. Connection failures are retried in the background.
    #[must_use]
    pub fn spawn(config: SubscriberConfig) -> Self {
        let (broadcast_tx, _) = broadcast::channel(config.broadcast_buffer);
        let (control_tx, control_rx) = mpsc::channel(256);
        let subscribed = Arc::new(RwLock::new(HashSet::new()));

        tokio::spawn(Self::listener_loop(
            config,
            subscribed.clone(),
            broadcast_tx.clone(),
            control_rx,
        ));

        Self {
            subscribed,
            broadcast_tx,
            control_tx,
        }
    }

    async fn listener_loop(
        config: SubscriberConfig,
        subscribed: Arc<RwLock<HashSet<String>>>,
        broadcast_tx: broadcast::Sender<ReceivedMessage>,
        mut control_rx: mpsc::Receiver<SubscriberCommand>,
    ) {
        loop {
            match Self::run_listener(&config, &subscribed, &broadcast_tx, &mut control_rx).await {
                Ok(true) => {
                    tracing::info!("Subscriber shutting down");
                    break;
                }
                Ok(false) => {
                    tracing::warn!("Pub/Sub stream ended, reconnecting");
                }
                Err(e) => {
                    tracing::error!(error = %e, "Subscriber error, reconnecting");
                }
            }
            tokio::time::sleep(Duration::from_millis(config.reconnect_delay_ms)).await;
        }
    }

    /// Returns `Ok(true)` on shutdown and `Ok(false)` when the stream ends
    async fn run_listener(
        config: &SubscriberConfig,
        subscribed: &RwLock<HashSet<String>>,
        broadcast_tx: &broadcast::Sender<ReceivedMessage>,
        control_rx: &mut mpsc::Receiver<SubscriberCommand>,
    ) -> SubscriberResult<bool> {
        let client = Client::open(config.redis_url.as_str())?;
        let mut pubsub = client.get_async_pubsub().await?;

        // Restore subscriptions from before a reconnect
        let existing: Vec<String> = subscribed.read().await.iter().cloned().collect();
        for channel in &existing {
            pubsub.subscribe(channel).await?;
        }

        tracing::info!(channels = existing.len(), "Subscriber connected to Redis");

        let mut stream = pubsub.on_message();

        loop {
            tokio::select! {
                msg = stream.next() => {
                    let Some(msg) = msg else {
                        return Ok(false);
                    };

                    let channel_name = msg.get_channel_name().to_string();
                    let payload: String = msg.get_payload().unwrap_or_default();

                    match ReceivedMessage::from_redis(&channel_name, &payload) {
                        Some(received) => {
                            tracing::trace!(channel = %channel_name, "Received Pub/Sub message");
                            // No receivers is fine
                            let _ = broadcast_tx.send(received);
                        }
                        None => tracing::debug!(channel = %channel_name, "Ignoring unknown channel"),
                    }
                }

                cmd = control_rx.recv() => {
                    match cmd {
                        Some(SubscriberCommand::Subscribe(channels)) => {
                            drop(stream);
                            // Recorded first so a failed SUBSCRIBE is retried after reconnect
                            subscribed.write().await.extend(channels.iter().cloned());
                            for channel in &channels {
                                pubsub.subscribe(channel).await?;
                                tracing::debug!(channel = %channel, "Subscribed");
                            }
                            stream = pubsub.on_message();
                        }
                        Some(SubscriberCommand::Unsubscribe(channels)) => {
                            drop(stream);
                            for channel in channels {
                                pubsub.unsubscribe(&channel).await?;
                                tracing::debug!(channel = %channel, "Unsubscribed");
                                subscribed.write().await.remove(&channel);
                            }
                            stream = pubsub.on_message();
                        }
                        Some(SubscriberCommand::Shutdown) | None => return Ok(true),
                    }
                }
            }
        }
    }

    pub async fn subscribe(&self, channels: &[PubSubChannel]) -> SubscriberResult<()> {
        if channels.is_empty() {
            return Ok(());
        }
        let names = channels.iter().map(PubSubChannel::name).collect();
        self.control_tx
            .send(SubscriberCommand::Subscribe(names))
            .await
            .map_err(|_| SubscriberError::ChannelClosed)
    }

    pub async fn unsubscribe(&self, channels: &[PubSubChannel]) -> SubscriberResult<()> {
        if channels.is_empty() {
            return Ok(());
        }
        let names = channels.iter().map(PubSubChannel::name).collect();
        self.control_tx
            .send(SubscriberCommand::Unsubscribe(names))
            .await
            .map_err(|_| SubscriberError::ChannelClosed)
    }

    #[must_use]
    pub fn receiver(&self) -> broadcast::Receiver<ReceivedMessage> {
        self.broadcast_tx.subscribe()
    }

    /// Channels the listener has picked up a subscribe command for
    pub async fn subscribed_channels(&self) -> Vec<String> {
        self.subscribed.read().await.iter().cloned().collect()
    }

    pub async fn shutdown(&self) -> SubscriberResult<()> {
        self.control_tx
            .send(SubscriberCommand::Shutdown)
            .await
            .map_err(|_| SubscriberError::ChannelClosed)
    }
}

pub struct SubscriberBuilder {
    config: SubscriberConfig,
    initial_channels: Vec<PubSubChannel>,
}

impl SubscriberBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: SubscriberConfig::default(),
            initial_channels: Vec::new(),
        }
    }

    #[must_use]
    pub fn redis_url(mut self, url: impl Into<String>) -> Self {
        self.config.redis_url = url.into();
        self
    }

    #[must_use]
    pub fn broadcast_buffer(mut self, size: usize) -> Self {
        self.config.broadcast_buffer = size;
        self
    }

    #[must_use]
    pub fn reconnect_delay_ms(mut self, delay: u64) -> Self {
        self.config.reconnect_delay_ms = delay;
        self
    }

    #[must_use]
    pub fn subscribe(mut self, channel: PubSubChannel) -> Self {
        self.initial_channels.push(channel);
        self
    }

    /// Spawn the listener and queue the initial subscriptions
    pub async fn build(self) -> SubscriberResult<Subscriber> {
        let subscriber = Subscriber::spawn(self.config);
        subscriber.subscribe(&self.initial_channels).await?;
        Ok(subscriber)
    }
}

impl Default for SubscriberBuilder {
    fn default() -> Self {
        Self::new()
    }
}

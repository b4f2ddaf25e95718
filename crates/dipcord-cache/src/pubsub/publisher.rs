//! Redis Pub/Sub publisher.
//!
//! Services publish [`RealtimeEvent`]s here; the gateway picks them up from
//! Redis and forwards them to WebSocket clients.

use async_trait::async_trait;
use dipcord_core::RealtimeEvent;
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};

use crate::pool::{RedisPool, RedisResult};
use crate::pubsub::PubSubChannel;

/// Envelope stored on the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PubSubEvent {
    /// Event name, e.g. `message:created`
    pub event_type: String,
    pub data: serde_json::Value,
}

impl PubSubEvent {
    #[must_use]
    pub fn new(event_type: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            event_type: event_type.into(),
            data,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Back to the typed event; `None` for names this build does not know
    #[must_use]
    pub fn to_realtime(&self) -> Option<RealtimeEvent> {
        RealtimeEvent::from_parts(&self.event_type, self.data.clone())
    }
}

impl From<&RealtimeEvent> for PubSubEvent {
    fn from(event: &RealtimeEvent) -> Self {
        Self::new(event.name(), event.payload())
    }
}

/// Sink for realtime events
///
/// Services depend on this rather than on Redis directly so they can be
/// exercised without a running server.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish to the event's natural target. Returns the receiver count.
    async fn publish_event(&self, event: &RealtimeEvent) -> RedisResult<u32>;
}

/// Redis Pub/Sub publisher
#[derive(Clone)]
pub struct Publisher {
    pool: RedisPool,
}

impl Publisher {
    #[must_use]
    pub fn new(pool: RedisPool) -> Self {
        Self { pool }
    }

    pub async fn publish(&self, channel: &PubSubChannel, event: &PubSubEvent) -> RedisResult<u32> {
        let payload = event.to_json()?;
        let channel_name = channel.name();

        let mut conn = self.pool.get().await?;
        let receivers: u32 = conn.publish(&channel_name, &payload).await?;

        tracing::debug!(
            channel = %channel_name,
            event_type = %event.event_type,
            receivers,
            "Published event"
        );

        Ok(receivers)
    }

    /// Same event to several channels over one connection
    pub async fn publish_many(
        &self,
        channels: &[PubSubChannel],
        event: &PubSubEvent,
    ) -> RedisResult<u32> {
        if channels.is_empty() {
            return Ok(0);
        }

        let payload = event.to_json()?;
        let mut conn = self.pool.get().await?;
        let mut total_receivers = 0;

        for channel in channels {
            let receivers: u32 = conn.publish(channel.name(), &payload).await?;
            total_receivers += receivers;
        }

        tracing::debug!(
            channels = channels.len(),
            event_type = %event.event_type,
            total_receivers,
            "Published event to multiple channels"
        );

        Ok(total_receivers)
    }
}

#[async_trait]
impl EventPublisher for Publisher {
    async fn publish_event(&self, event: &RealtimeEvent) -> RedisResult<u32> {
        let channel = PubSubChannel::from(event.target());
        self.publish(&channel, &PubSubEvent::from(event)).await
    }
}

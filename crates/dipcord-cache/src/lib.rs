//! # dipcord-cache
//!
//! Redis layer for refresh-token sessions and realtime fan-out.
//!
//! - **Connection pool**: deadpool-redis with JSON helpers
//! - **Sessions**: refresh token `jti` tracking with rotation and revocation
//! - **Pub/Sub**: realtime events published by the API, consumed by the gateway
//!
//! ```ignore
//! use dipcord_cache::{EventPublisher, Publisher, RedisPool, RedisPoolConfig};
//! use dipcord_core::RealtimeEvent;
//!
//! let pool = RedisPool::new(RedisPoolConfig::default())?;
//! let publisher = Publisher::new(pool.clone());
//! publisher
//!     .publish_event(&RealtimeEvent::ChannelUpdated { channel_id })
//!     .await?;
//! ```

pub mod pool;
pub mod pubsub;
pub mod session;

pub use pool::{
    create_shared_pool, RedisPool, RedisPoolConfig, RedisPoolError, RedisResult, SharedRedisPool,
};

pub use session::{RefreshTokenData, RefreshTokenStore};

pub use pubsub::{
    EventPublisher, PubSubChannel, PubSubEvent, Publisher, ReceivedMessage, Subscriber,
    SubscriberBuilder, SubscriberConfig, SubscriberError, SubscriberResult, BROADCAST_CHANNEL,
    CHANNEL_PREFIX, USER_CHANNEL_PREFIX,
};

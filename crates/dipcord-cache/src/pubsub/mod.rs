//! Redis Pub/Sub for realtime fan-out between the API and the gateway.

mod channels;
mod publisher;
mod subscriber;

pub use channels::{PubSubChannel, BROADCAST_CHANNEL, CHANNEL_PREFIX, USER_CHANNEL_PREFIX};
pub use publisher::{EventPublisher, PubSubEvent, Publisher};
pub use subscriber::{
    ReceivedMessage, Subscriber, SubscriberBuilder, SubscriberConfig, SubscriberError,
    SubscriberResult,
};

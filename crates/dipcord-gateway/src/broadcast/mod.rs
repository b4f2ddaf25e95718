//! Event broadcasting
//!
//! Moves events from Redis Pub/Sub onto WebSocket connections.

mod dispatcher;

pub use dispatcher::{EventDispatcher, EventDispatcherConfig};

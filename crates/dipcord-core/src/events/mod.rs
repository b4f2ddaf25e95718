//! Realtime events pushed to connected clients

mod realtime;

pub use realtime::{EventTarget, ReactionAction, RealtimeEvent};

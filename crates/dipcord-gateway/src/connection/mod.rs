//! Connection management
//!
//! Live WebSocket connections and the indexes used to route events to them.

mod connection;
mod manager;

pub use connection::{Connection, ConnectionState, Outbound};
pub use manager::{ConnectionManager, Released};

//! End-to-end test utilities
//!
//! Spawns the REST API and the WebSocket gateway in-process against a real
//! PostgreSQL and Redis, then drives them over HTTP and WebSocket.

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;

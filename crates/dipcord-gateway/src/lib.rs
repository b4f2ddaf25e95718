//! # dipcord-gateway
//!
//! WebSocket gateway. Clients identify with their access token and then
//! receive "something changed" events for the channels they belong to.

pub mod broadcast;
pub mod connection;
pub mod handlers;
pub mod protocol;
pub mod server;

pub use server::{create_app, create_gateway_state, run, run_server, GatewayState};

//! Route handlers
//!
//! Thin adapters: extract, call one service method, wrap the result.

pub mod auth;
pub mod channels;
pub mod health;
pub mod invites;
pub mod members;
pub mod messages;
pub mod polls;
pub mod tasks;
pub mod users;

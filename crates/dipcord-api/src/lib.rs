//! # dipcord-api
//!
//! REST API server for Dipcord, built on Axum. Every route lives under `/v1`
//! except the health checks.

pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod server;
pub mod state;

pub use server::{create_app, create_app_state, run, run_server};
pub use state::AppState;

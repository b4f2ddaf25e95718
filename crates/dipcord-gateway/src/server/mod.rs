//! Gateway server setup

mod handler;
mod state;

pub use handler::gateway_handler;
pub use state::GatewayState;

use std::sync::Arc;

use axum::{routing::get, Router};
use dipcord_cache::{create_shared_pool, RedisPoolConfig};
use dipcord_common::{AppConfig, AppError, JwtService};
use dipcord_core::SnowflakeGenerator;
use dipcord_db::{create_pool, PoolConfig};
use dipcord_service::ServiceContextBuilder;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::broadcast::{EventDispatcher, EventDispatcherConfig};
use crate::connection::ConnectionManager;

pub fn create_router() -> Router<GatewayState> {
    Router::new()
        .route("/gateway", get(gateway_handler))
        .route("/health", get(health_check))
}

async fn health_check() -> &'static str {
    "OK"
}

pub fn create_app(state: GatewayState) -> Router {
    create_router()
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the Redis listener that feeds every socket in this process
pub async fn create_event_dispatcher(config: &AppConfig) -> Result<Arc<EventDispatcher>, AppError> {
    let dispatcher_config = EventDispatcherConfig {
        redis_url: config.redis.url.clone(),
        ..EventDispatcherConfig::default()
    };

    let dispatcher = EventDispatcher::new(dispatcher_config, ConnectionManager::new_shared())
        .await
        .map_err(|e| AppError::Cache(format!("Failed to create event dispatcher: {e}")))?;
    let dispatcher = Arc::new(dispatcher);
    dispatcher.clone().start();

    Ok(dispatcher)
}

/// Connect to every backing service and build the shared state
///
/// The gateway never migrates; the API server owns the schema.
pub async fn create_gateway_state(config: AppConfig) -> Result<GatewayState, AppError> {
    info!("Connecting to PostgreSQL...");
    let pool = create_pool(&PoolConfig::from(&config.database))
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    info!("PostgreSQL connection established");

    info!("Connecting to Redis...");
    let redis_pool = create_shared_pool(RedisPoolConfig::from(&config.redis))
        .map_err(|e| AppError::Cache(e.to_string()))?;
    redis_pool
        .health_check()
        .await
        .map_err(|e| AppError::Cache(e.to_string()))?;
    info!("Redis connection established");

    let jwt_service = Arc::new(JwtService::new(
        &config.jwt.secret,
        config.jwt.access_token_expiry,
        config.jwt.refresh_token_expiry,
    ));
    let snowflake_generator = Arc::new(SnowflakeGenerator::new(config.snowflake.worker_id));

    let service_context = ServiceContextBuilder::new()
        .postgres(pool)
        .redis_pool(redis_pool)
        .jwt_service(jwt_service)
        .snowflake_generator(snowflake_generator)
        .build()
        .map_err(|e| AppError::Config(e.to_string()))?;

    let event_dispatcher = create_event_dispatcher(&config).await?;

    Ok(GatewayState::new(service_context, event_dispatcher, config))
}

/// Serve until the process receives Ctrl-C
pub async fn run_server(app: Router, addr: &str) -> Result<(), AppError> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Config(format!("Failed to bind to {addr}: {e}")))?;

    info!("Gateway listening on ws://{}/gateway", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::Config(format!("Server error: {e}")))?;

    info!("Gateway stopped");
    Ok(())
}

/// Run the complete gateway server with configuration
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let addr = config.gateway.address();

    let state = create_gateway_state(config).await?;
    let dispatcher = state.event_dispatcher_handle();
    let app = create_app(state);

    let result = run_server(app, &addr).await;
    dispatcher.stop().await;
    result
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

//! Server setup and initialization
//!
//! Wires PostgreSQL, Redis, JWT and the snowflake generator into a
//! [`ServiceContext`](dipcord_service::ServiceContext), then serves the router.

use std::sync::Arc;

use axum::Router;
use dipcord_cache::{create_shared_pool, RedisPoolConfig};
use dipcord_common::{AppConfig, AppError, JwtService};
use dipcord_core::SnowflakeGenerator;
use dipcord_db::{create_pool, run_migrations, PoolConfig};
use dipcord_service::ServiceContextBuilder;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::middleware::{apply_middleware, apply_health_middleware};
use crate::routes::{create_router, health_routes};
use crate::state::AppState;

/// Build the application: rate-limited API routes plus unthrottled health checks
pub fn create_app(state: AppState) -> Result<Router, AppError> {
    let config = state.config();
    let api = apply_middleware(
        create_router(),
        &config.rate_limit,
        &config.cors,
        config.app.env.is_production(),
    )?;
    let health = apply_health_middleware(health_routes());

    Ok(api.merge(health).with_state(state))
}

/// Connect to every backing service and build the shared state
pub async fn create_app_state(config: AppConfig) -> Result<AppState, AppError> {
    info!("Connecting to PostgreSQL...");
    let pool = create_pool(&PoolConfig::from(&config.database))
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    info!("PostgreSQL connection established");

    if config.database.run_migrations {
        run_migrations(&pool)
            .await
            .map_err(|e| AppError::Database(format!("Migration failed: {e}")))?;
        info!("Database migrations applied");
    } else {
        warn!("Skipping migrations (DATABASE_RUN_MIGRATIONS=false)");
    }

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

    Ok(AppState::new(service_context, config))
}

/// Serve until the process receives Ctrl-C
pub async fn run_server(app: Router, addr: &str) -> Result<(), AppError> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Config(format!("Failed to bind to {addr}: {e}")))?;

    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::Config(format!("Server error: {e}")))?;

    info!("Server stopped");
    Ok(())
}

/// Run the complete server with configuration
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let addr = config.api.address();

    let state = create_app_state(config).await?;
    let app = create_app(state)?;

    run_server(app, &addr).await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

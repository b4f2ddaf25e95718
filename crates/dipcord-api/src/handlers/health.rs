//! Health check handlers
//!
//! Liveness and readiness checks. Both skip authentication and rate limiting.

use axum::{extract::State, http::StatusCode, Json};
use dipcord_service::dto::{HealthResponse, ReadinessResponse};
use tracing::warn;

use crate::state::AppState;

/// Liveness check
///
/// GET /health
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

/// Readiness check, checks PostgreSQL and Redis
///
/// GET /health/ready
pub async fn readiness_check(State(state): State<AppState>) -> (StatusCode, Json<ReadinessResponse>) {
    let ctx = state.service_context();

    let db_healthy = match sqlx::query("SELECT 1").execute(ctx.pool()).await {
        Ok(_) => true,
        Err(e) => {
            warn!(error = %e, "Database readiness check failed");
            false
        }
    };

    let redis_healthy = match ctx.redis_pool().health_check().await {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, "Redis readiness check failed");
            false
        }
    };

    let response = ReadinessResponse::ready(db_healthy, redis_healthy);
    let status = if db_healthy && redis_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(response))
}

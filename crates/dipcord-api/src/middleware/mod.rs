//! Middleware stack for the API server
//!
//! Request ids, tracing spans, a 30 second timeout, CORS and a global rate limit.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{header, HeaderName, HeaderValue, Method, Request, StatusCode},
    Router,
};
use dipcord_common::{AppError, CorsConfig, RateLimitConfig};
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::GlobalKeyExtractor, GovernorLayer,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{info, warn, Level};

use crate::state::AppState;

/// Header name for request ID
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Requests running longer than this get a 503
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

fn request_id_header() -> HeaderName {
    HeaderName::from_static(REQUEST_ID_HEADER)
}

/// Apply the full middleware stack
///
/// Tower applies layers bottom-up, so the order below reads
/// CORS, Timeout, Trace, RequestID, RateLimit from the handler outwards.
pub fn apply_middleware(
    router: Router<AppState>,
    rate_limit: &RateLimitConfig,
    cors: &CorsConfig,
    is_production: bool,
) -> Result<Router<AppState>, AppError> {
    let invalid = || {
        AppError::Config(format!(
            "Invalid rate limit: {} req/s, burst {}",
            rate_limit.requests_per_second, rate_limit.burst
        ))
    };

    // One token every `replenish_ms`; global key means one bucket for the whole process
    let replenish_ms = 1000_u64
        .checked_div(u64::from(rate_limit.requests_per_second))
        .ok_or_else(invalid)?
        .max(1);
    let governor_conf = GovernorConfigBuilder::default()
        .per_millisecond(replenish_ms)
        .burst_size(rate_limit.burst)
        .key_extractor(GlobalKeyExtractor)
        .finish()
        .ok_or_else(invalid)?;

    Ok(router
        .layer(create_cors_layer(cors, is_production))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::SERVICE_UNAVAILABLE,
            REQUEST_TIMEOUT,
        ))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = request
                        .headers()
                        .get(REQUEST_ID_HEADER)
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("unknown");

                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = %request_id,
                    )
                })
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(PropagateRequestIdLayer::new(request_id_header()))
        .layer(SetRequestIdLayer::new(request_id_header(), MakeRequestUuid))
        .layer(GovernorLayer {
            config: Arc::new(governor_conf),
        }))
}

/// Request ids and tracing only; used for the health routes
pub fn apply_health_middleware(router: Router<AppState>) -> Router<AppState> {
    router
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::new(request_id_header()))
        .layer(SetRequestIdLayer::new(request_id_header(), MakeRequestUuid))
}

/// Configured origins in production; any origin in development when none are set
fn create_cors_layer(config: &CorsConfig, is_production: bool) -> CorsLayer {
    let base_layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::ACCEPT,
            request_id_header(),
        ])
        .expose_headers([
            request_id_header(),
            HeaderName::from_static("x-ratelimit-limit"),
            HeaderName::from_static("x-ratelimit-remaining"),
            HeaderName::from_static("x-ratelimit-reset"),
        ]);

    if !is_production && config.allowed_origins.is_empty() {
        warn!("CORS: Allowing any origin (development mode). Set CORS_ALLOWED_ORIGINS for production.");
        return base_layer.allow_origin(Any);
    }

    if config.allowed_origins.is_empty() {
        warn!("CORS: No allowed origins configured in production mode; browsers will be blocked");
    }

    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| {
            origin.parse::<HeaderValue>().ok().or_else(|| {
                warn!(origin = %origin, "Invalid CORS origin");
                None
            })
        })
        .collect();

    info!(count = origins.len(), "CORS: Allowing configured origins");
    base_layer.allow_origin(AllowOrigin::list(origins))
}

//! Authentication handlers
//!
//! Endpoints for user registration, login, logout, and token refresh.

use axum::{extract::State, Json};
use dipcord_service::{
    dto::{AuthResponse, LoginRequest, RefreshTokenRequest, RegisterRequest},
    AuthService,
};

use crate::extractors::{AuthUser, JsonBody, ValidatedJson};
use crate::response::{ApiResult, Created, NoContent};
use crate::state::AppState;

/// Register a new user
///
/// POST /auth/register
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<RegisterRequest>,
) -> ApiResult<Created<Json<AuthResponse>>> {
    let service = AuthService::new(state.service_context());
    let response = service.register(request).await?;
    Ok(Created(Json(response)))
}

/// Login with email and password
///
/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let service = AuthService::new(state.service_context());
    let response = service.login(request).await?;
    Ok(Json(response))
}

/// Rotate a refresh token
///
/// POST /auth/refresh
pub async fn refresh_token(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<RefreshTokenRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let service = AuthService::new(state.service_context());
    let response = service.refresh(&request.refresh_token).await?;
    Ok(Json(response))
}

/// Revoke every refresh token of the caller
///
/// POST /auth/logout
pub async fn logout(State(state): State<AppState>, auth: AuthUser) -> ApiResult<NoContent> {
    let service = AuthService::new(state.service_context());
    service.logout(auth.user_id).await?;
    Ok(NoContent)
}

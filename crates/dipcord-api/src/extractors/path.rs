//! Path parameter extractors
//!
//! Snowflakes travel as decimal strings in URLs; a malformed id is a 400,
//! never a 404.

use axum::{
    async_trait,
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use serde::de::DeserializeOwned;

use crate::response::ApiError;

/// Longest code accepted in a URL before hitting storage
const MAX_INVITE_CODE_LEN: usize = 32;

/// Path extractor that rejects with the JSON error envelope
///
/// `T` is usually a [`Snowflake`](dipcord_core::Snowflake) or a tuple of them.
#[derive(Debug, Clone)]
pub struct SnowflakePath<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for SnowflakePath<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(inner) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::invalid_path(e.to_string()))?;

        Ok(SnowflakePath(inner))
    }
}

/// Invite code from `/invites/:code`
#[derive(Debug, Clone)]
pub struct InviteCodePath(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for InviteCodePath
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(code) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::invalid_path(e.to_string()))?;

        if code.is_empty()
            || code.len() > MAX_INVITE_CODE_LEN
            || !code.chars().all(|c| c.is_ascii_alphanumeric())
        {
            return Err(ApiError::invalid_path("Invalid invite code format"));
        }

        Ok(InviteCodePath(code))
    }
}

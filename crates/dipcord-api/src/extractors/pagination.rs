//! Pagination and query-string extractors
//!
//! Cursor pagination over snowflake ids: `?before=`, `?after=` and `?limit=`.

use axum::{
    async_trait,
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use dipcord_core::{CursorQuery, Snowflake};
use serde::{de::DeserializeOwned, Deserialize};

use crate::response::ApiError;

/// Default page size
const DEFAULT_LIMIT: i64 = 50;
/// Maximum page size
const MAX_LIMIT: i64 = 100;

/// Raw pagination query parameters
#[derive(Debug, Deserialize)]
pub struct PaginationParams {
    #[serde(default)]
    pub before: Option<String>,
    #[serde(default)]
    pub after: Option<String>,
    #[serde(default)]
    pub limit: Option<i64>,
}

/// Validated pagination parameters
#[derive(Debug, Clone)]
pub struct Pagination {
    pub before: Option<Snowflake>,
    pub after: Option<Snowflake>,
    /// Clamped to 1-100
    pub limit: i64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            before: None,
            after: None,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl Pagination {
    pub fn with_limit(limit: i64) -> Self {
        Self {
            limit: limit.clamp(1, MAX_LIMIT),
            ..Self::default()
        }
    }

    /// Repository cursor for this page
    pub fn into_query(self) -> CursorQuery {
        CursorQuery {
            before: self.before,
            after: self.after,
            limit: self.limit,
        }
    }
}

fn parse_cursor(value: Option<String>, name: &str) -> Result<Option<Snowflake>, ApiError> {
    value
        .map(|s| {
            s.parse::<Snowflake>()
                .map_err(|_| ApiError::invalid_query(format!("Invalid '{name}' cursor format")))
        })
        .transpose()
}

impl TryFrom<PaginationParams> for Pagination {
    type Error = ApiError;

    fn try_from(params: PaginationParams) -> Result<Self, Self::Error> {
        let before = parse_cursor(params.before, "before")?;
        let after = parse_cursor(params.after, "after")?;
        let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);

        Ok(Pagination {
            before,
            after,
            limit,
        })
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Pagination
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let QueryParams(params) = QueryParams::<PaginationParams>::from_request_parts(parts, state).await?;
        Pagination::try_from(params)
    }
}

/// `Query<T>` with a JSON error envelope on rejection
#[derive(Debug, Clone)]
pub struct QueryParams<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for QueryParams<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::invalid_query(e.body_text()))?;
        Ok(QueryParams(value))
    }
}

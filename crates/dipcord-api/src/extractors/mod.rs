//! Axum extractors for request handling
//!
//! Custom extractors for authentication, validation, path ids and pagination.
//! All of them reject with [`ApiError`](crate::response::ApiError) so clients
//! always receive the JSON error envelope.

mod auth;
mod pagination;
mod path;
mod validated;

pub use auth::AuthUser;
pub use pagination::{Pagination, PaginationParams, QueryParams};
pub use path::{InviteCodePath, SnowflakePath};
pub use validated::{JsonBody, ValidatedJson};

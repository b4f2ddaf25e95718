//! Model to entity mappers
//!
//! `From<Model> for Entity` conversions. Enum-like text columns (member role,
//! task status) fall back to their most restrictive value when the database
//! holds something unexpected.

mod channel;
mod invite;
mod member;
mod message;
mod poll;
mod reaction;
mod task;
mod user;

pub use member::role_from_str;
pub use task::status_from_str;

/// Snowflakes to the raw ids sqlx binds as `BIGINT[]`
pub(crate) fn raw_ids(ids: &[dipcord_core::Snowflake]) -> Vec<i64> {
    ids.iter().map(|id| id.into_inner()).collect()
}

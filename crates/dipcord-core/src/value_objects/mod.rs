//! Value objects - small immutable types shared by entities and services

mod access;
mod permissions;
mod snowflake;

pub use access::AccessSettings;
pub use permissions::{MemberPermissions, MemberRole};
pub use snowflake::{Snowflake, SnowflakeGenerator, SnowflakeParseError};

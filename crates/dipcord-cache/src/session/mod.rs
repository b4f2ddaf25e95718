//! Session storage
//!
//! Server-side tracking of refresh tokens so they can be rotated and revoked.

mod refresh_token;

pub use refresh_token::{RefreshTokenData, RefreshTokenStore};

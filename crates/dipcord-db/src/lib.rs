//! # dipcord-db
//!
//! PostgreSQL implementations of the dipcord-core repository traits via SQLx.
//!
//! - Connection pool and embedded migrations
//! - Row models with `FromRow` derives
//! - Model to entity mappers
//! - Repository implementations
//!
//! ```rust,ignore
//! use dipcord_core::UserRepository;
//! use dipcord_db::{create_pool, run_migrations, PgUserRepository, PoolConfig};
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = create_pool(&PoolConfig::new("postgres://localhost/dipcord")).await?;
//!     run_migrations(&pool).await?;
//!     let users = PgUserRepository::new(pool);
//!     Ok(())
//! }
//! ```

pub mod mappers;
pub mod models;
pub mod pool;
pub mod repositories;

pub use pool::{create_pool, run_migrations, PgPool, PoolConfig};
pub use repositories::{
    PgChannelRepository, PgInviteRepository, PgMemberRepository, PgMessageRepository,
    PgPollRepository, PgReactionRepository, PgTaskRepository, PgUserRepository,
};

//! Repository implementations
//!
//! PostgreSQL implementations of the repository traits defined in dipcord-core.

mod channel;
mod error;
mod invite;
mod member;
mod message;
mod poll;
mod reaction;
mod task;
mod user;

pub use channel::PgChannelRepository;
pub use error::{map_db_error, map_unique_violation};
pub use invite::PgInviteRepository;
pub use member::PgMemberRepository;
pub use message::PgMessageRepository;
pub use poll::PgPollRepository;
pub use reaction::PgReactionRepository;
pub use task::PgTaskRepository;
pub use user::PgUserRepository;

//! # dipcord-core
//!
//! Domain layer for Dipcord: entities, value objects, repository traits and
//! the catalogue of realtime events. Nothing in here knows about PostgreSQL,
//! Redis or HTTP.

pub mod entities;
pub mod error;
pub mod events;
pub mod traits;
pub mod value_objects;

pub use entities::{
    generate_invite_code, Channel, ChannelInvite, ChannelMember, Message, MessageAttachment,
    MessageMention, MessageReaction, Poll, PollOption, PollVote, ReactionSummary, Task,
    TaskStatus, User,
};
pub use error::DomainError;
pub use events::{EventTarget, ReactionAction, RealtimeEvent};
pub use traits::{
    ChannelCascade, ChannelRepository, CursorQuery, InviteRedemption, InviteRepository,
    MemberRepository,
    MessageRepository, NewMessage, PollRepository, ReactionRepository, RepoResult,
    TaskRepository, UserRepository,
};
pub use value_objects::{
    AccessSettings, MemberPermissions, MemberRole, Snowflake, SnowflakeGenerator,
    SnowflakeParseError,
};

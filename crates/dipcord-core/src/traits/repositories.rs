//! Repository traits (ports) - define the interface for data access
//!
//! The domain layer defines what it needs, and the infrastructure layer
//! provides the implementation.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::entities::{
    Channel, ChannelInvite, ChannelMember, Message, MessageAttachment, MessageMention,
    MessageReaction, Poll, PollOption, PollVote, ReactionSummary, Task, TaskStatus, User,
};
use crate::error::DomainError;
use crate::value_objects::Snowflake;

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

/// Snowflake cursor used by every paged listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorQuery {
    pub before: Option<Snowflake>,
    pub after: Option<Snowflake>,
    pub limit: i64,
}

impl CursorQuery {
    pub fn latest(limit: i64) -> Self {
        Self {
            before: None,
            after: None,
            limit,
        }
    }
}

impl Default for CursorQuery {
    fn default() -> Self {
        Self::latest(50)
    }
}

// ============================================================================
// User Repository
// ============================================================================

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<User>>;

    /// Lookup by (already lowercased) email
    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>>;

    /// Batch lookup; missing ids are skipped
    async fn find_many(&self, ids: &[Snowflake]) -> RepoResult<Vec<User>>;

    async fn email_exists(&self, email: &str) -> RepoResult<bool>;

    async fn create(&self, user: &User, password_hash: &str) -> RepoResult<()>;

    async fn update(&self, user: &User) -> RepoResult<()>;

    async fn get_password_hash(&self, id: Snowflake) -> RepoResult<Option<String>>;
}

// ============================================================================
// Channel Repository
// ============================================================================

/// Row counts removed by a channel cascade
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChannelCascade {
    pub messages: u64,
    pub members: u64,
    pub invites: u64,
    pub tasks: u64,
    pub polls: u64,
}

#[async_trait]
pub trait ChannelRepository: Send + Sync {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Channel>>;

    /// Channels the user is a member of
    async fn find_by_member(&self, user_id: Snowflake) -> RepoResult<Vec<Channel>>;

    /// Public channels with their current member count, newest first
    async fn find_public(&self, query: CursorQuery) -> RepoResult<Vec<(Channel, i64)>>;

    /// Insert the channel and its owner membership in one transaction
    async fn create_with_owner(&self, channel: &Channel, owner: &ChannelMember) -> RepoResult<()>;

    async fn update(&self, channel: &Channel) -> RepoResult<()>;

    /// Remove the channel and everything hanging off it in one transaction
    async fn delete_cascade(&self, id: Snowflake) -> RepoResult<ChannelCascade>;
}

// ============================================================================
// Member Repository
// ============================================================================

#[async_trait]
pub trait MemberRepository: Send + Sync {
    async fn find(&self, channel_id: Snowflake, user_id: Snowflake)
        -> RepoResult<Option<ChannelMember>>;

    /// Members ordered by user id, starting after `after`
    async fn find_by_channel(
        &self,
        channel_id: Snowflake,
        after: Option<Snowflake>,
        limit: i64,
    ) -> RepoResult<Vec<ChannelMember>>;

    async fn count(&self, channel_id: Snowflake) -> RepoResult<i64>;

    /// Insert unconditionally. Duplicate rows map to `AlreadyMember`.
    async fn create(&self, member: &ChannelMember) -> RepoResult<()>;

    /// Insert only while the channel has fewer than `max_participants` members.
    /// Returns `false` when the channel is full.
    async fn create_within_capacity(
        &self,
        member: &ChannelMember,
        max_participants: i32,
    ) -> RepoResult<bool>;

    async fn update(&self, member: &ChannelMember) -> RepoResult<()>;

    /// Returns whether a row was removed
    async fn delete(&self, channel_id: Snowflake, user_id: Snowflake) -> RepoResult<bool>;

    /// Swap owner and target atomically. The old owner becomes `old_owner`.
    async fn transfer_ownership(&self, old_owner: &ChannelMember, new_owner: &ChannelMember)
        -> RepoResult<()>;

    async fn channel_ids_for_user(&self, user_id: Snowflake) -> RepoResult<Vec<Snowflake>>;
}

// ============================================================================
// Invite Repository
// ============================================================================

/// Outcome of redeeming a single-use invite
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InviteRedemption {
    Joined,
    ChannelFull,
    /// Another redemption claimed the code first
    AlreadyUsed,
}

#[async_trait]
pub trait InviteRepository: Send + Sync {
    async fn find_by_code(&self, code: &str) -> RepoResult<Option<ChannelInvite>>;

    async fn find_by_channel(&self, channel_id: Snowflake) -> RepoResult<Vec<ChannelInvite>>;

    /// Code collisions map to `InviteCodeExists`
    async fn create(&self, invite: &ChannelInvite) -> RepoResult<()>;

    /// Add `member` and claim the code in one transaction
    ///
    /// Nothing is written unless both the capacity check and the
    /// `is_used = false` claim succeed. Duplicate members map to `AlreadyMember`.
    async fn redeem(
        &self,
        code: &str,
        member: &ChannelMember,
        max_participants: i32,
    ) -> RepoResult<InviteRedemption>;

    async fn delete(&self, code: &str) -> RepoResult<bool>;
}

// ============================================================================
// Message Repository
// ============================================================================

/// A message together with the rows written alongside it
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub message: Message,
    pub attachments: Vec<MessageAttachment>,
    pub mentions: Vec<Snowflake>,
}

#[async_trait]
pub trait MessageRepository: Send + Sync {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Message>>;

    /// Top-level messages only, newest first
    async fn find_by_channel(&self, channel_id: Snowflake, query: CursorQuery)
        -> RepoResult<Vec<Message>>;

    /// Replies of a thread root, oldest first
    async fn find_replies(&self, parent_id: Snowflake, query: CursorQuery)
        -> RepoResult<Vec<Message>>;

    /// Reply count per thread root; roots without replies are absent
    async fn reply_counts(&self, ids: &[Snowflake]) -> RepoResult<HashMap<Snowflake, i64>>;

    /// Message, attachments and mentions in one transaction
    async fn create(&self, new: &NewMessage) -> RepoResult<()>;

    async fn update(&self, message: &Message) -> RepoResult<()>;

    async fn soft_delete(&self, id: Snowflake) -> RepoResult<()>;

    async fn find_attachments(&self, message_ids: &[Snowflake])
        -> RepoResult<Vec<MessageAttachment>>;

    async fn find_mentions(&self, message_ids: &[Snowflake]) -> RepoResult<Vec<MessageMention>>;
}

// ============================================================================
// Reaction Repository
// ============================================================================

#[async_trait]
pub trait ReactionRepository: Send + Sync {
    async fn find(
        &self,
        message_id: Snowflake,
        user_id: Snowflake,
        emoji: &str,
    ) -> RepoResult<Option<MessageReaction>>;

    /// Duplicate rows map to `ReactionAlreadyExists`
    async fn create(&self, reaction: &MessageReaction) -> RepoResult<()>;

    async fn delete(&self, message_id: Snowflake, user_id: Snowflake, emoji: &str)
        -> RepoResult<bool>;

    /// Per-emoji counts for each message, from the point of view of `viewer`
    async fn summarize(
        &self,
        message_ids: &[Snowflake],
        viewer: Snowflake,
    ) -> RepoResult<HashMap<Snowflake, Vec<ReactionSummary>>>;
}

// ============================================================================
// Task Repository
// ============================================================================

#[async_trait]
pub trait TaskRepository: Send + Sync {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Task>>;

    /// Ordered by (status, position)
    async fn find_by_channel(
        &self,
        channel_id: Snowflake,
        status: Option<TaskStatus>,
    ) -> RepoResult<Vec<Task>>;

    /// Position just past the last task of the column
    async fn next_position(&self, channel_id: Snowflake, status: TaskStatus) -> RepoResult<i32>;

    async fn create(&self, task: &Task) -> RepoResult<()>;

    async fn update(&self, task: &Task) -> RepoResult<()>;

    async fn delete(&self, id: Snowflake) -> RepoResult<bool>;
}

// ============================================================================
// Poll Repository
// ============================================================================

#[async_trait]
pub trait PollRepository: Send + Sync {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Poll>>;

    /// Newest first
    async fn find_by_channel(&self, channel_id: Snowflake, query: CursorQuery)
        -> RepoResult<Vec<Poll>>;

    /// Options of all given polls, ordered by position
    async fn find_options(&self, poll_ids: &[Snowflake]) -> RepoResult<Vec<PollOption>>;

    /// Poll and options in one transaction
    async fn create(&self, poll: &Poll, options: &[PollOption]) -> RepoResult<()>;

    /// Votes per option id
    async fn vote_counts(&self, poll_ids: &[Snowflake]) -> RepoResult<HashMap<Snowflake, i64>>;

    /// Distinct voters per poll id
    async fn voter_counts(&self, poll_ids: &[Snowflake]) -> RepoResult<HashMap<Snowflake, i64>>;

    async fn votes_for_user(&self, poll_ids: &[Snowflake], user_id: Snowflake)
        -> RepoResult<Vec<PollVote>>;

    /// Drop the user's previous ballot and store the new one atomically
    async fn replace_votes(
        &self,
        poll_id: Snowflake,
        user_id: Snowflake,
        option_ids: &[Snowflake],
    ) -> RepoResult<()>;

    async fn clear_votes(&self, poll_id: Snowflake, user_id: Snowflake) -> RepoResult<u64>;

    /// Returns whether the poll was open before the call
    async fn close(&self, poll_id: Snowflake) -> RepoResult<bool>;
}

//! Domain entities - core business objects

mod channel;
mod invite;
mod member;
mod message;
mod poll;
mod reaction;
mod task;
mod user;

pub use channel::Channel;
pub use invite::{generate_invite_code, ChannelInvite};
pub use member::ChannelMember;
pub use message::{Message, MessageAttachment, MessageMention};
pub use poll::{Poll, PollOption, PollVote};
pub use reaction::{MessageReaction, ReactionSummary};
pub use task::{Task, TaskStatus};
pub use user::User;

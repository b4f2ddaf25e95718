//! Database models - SQLx-compatible structs for PostgreSQL tables

mod channel;
mod invite;
mod member;
mod message;
mod poll;
mod reaction;
mod task;
mod user;

pub use channel::{ChannelModel, ChannelWithCountModel};
pub use invite::InviteModel;
pub use member::MemberModel;
pub use message::{AttachmentModel, MentionModel, MessageModel, ReplyCountModel};
pub use poll::{OptionCountModel, PollModel, PollOptionModel, PollVoteModel, VoterCountModel};
pub use reaction::{ReactionCountModel, ReactionModel};
pub use task::TaskModel;
pub use user::UserModel;

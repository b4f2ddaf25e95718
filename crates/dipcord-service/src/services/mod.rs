//! Business logic services
//!
//! Each service borrows a [`ServiceContext`] for the duration of a request,
//! checks the caller's membership and permissions, talks to the repositories
//! and publishes realtime events for whatever changed.

pub mod auth;
pub mod channel;
pub mod context;
pub mod error;
pub mod invite;
pub mod member;
pub mod message;
pub mod permission;
pub mod poll;
pub mod task;
pub mod user;

#[cfg(test)]
mod test_support;

pub use auth::AuthService;
pub use channel::ChannelService;
pub use context::{ServiceContext, ServiceContextBuilder};
pub use error::{ServiceError, ServiceResult};
pub use invite::InviteService;
pub use member::MemberService;
pub use message::MessageService;
pub use permission::{ChannelAccess, PermissionService};
pub use poll::PollService;
pub use task::TaskService;
pub use user::UserService;

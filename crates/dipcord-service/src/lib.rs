//! # dipcord-service
//!
//! Application layer: request/response DTOs and the services that implement
//! every channel, member, invite, message, task, poll and auth use case.

pub mod dto;
pub mod services;

pub use services::{
    AuthService, ChannelAccess, ChannelService, InviteService, MemberService, MessageService,
    PermissionService, PollService, ServiceContext, ServiceContextBuilder, ServiceError,
    ServiceResult, TaskService, UserService,
};

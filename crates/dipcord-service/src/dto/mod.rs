//! Data transfer objects for API requests and responses
//!
//! This module provides:
//! - Request DTOs with validation for API inputs
//! - Response DTOs for serializing API outputs
//! - Mappers for converting domain entities to DTOs

pub mod mappers;
pub mod requests;
pub mod responses;

pub use requests::{
    AddMemberRequest, AttachmentRequest, CreateChannelRequest, CreateInviteRequest,
    CreateMessageRequest, CreatePollRequest, CreateTaskRequest, LoginRequest,
    RefreshTokenRequest, RegisterRequest, TaskFilter, ToggleReactionRequest,
    TransferOwnershipRequest, UpdateChannelRequest, UpdateMemberRequest, UpdateMessageRequest,
    UpdateTaskRequest, UpdateTaskStatusRequest, UpdateUserRequest, VoteRequest,
};

pub use responses::{
    AttachmentResponse, AuthResponse, ChannelResponse, CurrentUserResponse, HealthChecks,
    HealthResponse, InviteChannelResponse, InvitePreviewResponse, InviteResponse,
    MemberResponse, MessageResponse, PollOptionResponse, PollResponse, ReactionResponse,
    ReactionToggleResponse, ReadinessResponse, TaskResponse, UserResponse,
};

pub use mappers::{MemberWithUser, MessageWithDetails, PollWithResults};

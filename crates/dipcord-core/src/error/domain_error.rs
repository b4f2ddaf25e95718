//! Domain errors - error types for the domain layer

use thiserror::Error;

use crate::value_objects::Snowflake;

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("User not found: {0}")]
    UserNotFound(Snowflake),

    #[error("Channel not found: {0}")]
    ChannelNotFound(Snowflake),

    #[error("Message not found: {0}")]
    MessageNotFound(Snowflake),

    #[error("Member not found in channel")]
    MemberNotFound,

    #[error("Invite not found: {0}")]
    InviteNotFound(String),

    #[error("Task not found: {0}")]
    TaskNotFound(Snowflake),

    #[error("Poll not found: {0}")]
    PollNotFound(Snowflake),

    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid email format")]
    InvalidEmail,

    #[error("Password too weak: {0}")]
    WeakPassword(String),

    #[error("Content too long: max {max} characters")]
    ContentTooLong { max: usize },

    #[error("Message must have content or attachments")]
    EmptyMessage,

    #[error("Too many attachments: max {max}")]
    TooManyAttachments { max: usize },

    #[error("Invalid emoji")]
    InvalidEmoji,

    #[error("Max participants must be between {min} and {max}")]
    InvalidCapacity { min: i32, max: i32 },

    #[error("Invalid poll options: {0}")]
    InvalidPollOptions(String),

    #[error("Option does not belong to this poll")]
    ForeignPollOption,

    #[error("Invalid vote selection")]
    InvalidVoteSelection,

    #[error("Parent message is not in this channel")]
    InvalidParentMessage,

    #[error("The owner role can only be given by transferring ownership")]
    CannotAssignOwnerRole,

    // =========================================================================
    // Authorization Errors
    // =========================================================================
    #[error("Missing permission: {0}")]
    MissingPermission(String),

    #[error("Not channel owner")]
    NotChannelOwner,

    #[error("Not a member of this channel")]
    NotChannelMember,

    #[error("Not message author")]
    NotMessageAuthor,

    #[error("Channel is private")]
    PrivateChannel,

    #[error("Cannot modify the channel owner")]
    CannotModifyOwner,

    #[error("Moderators cannot manage other moderators")]
    CannotModifyModerator,

    // =========================================================================
    // Conflict Errors
    // =========================================================================
    #[error("Email already in use")]
    EmailAlreadyExists,

    #[error("Already a member of this channel")]
    AlreadyMember,

    #[error("Reaction already exists")]
    ReactionAlreadyExists,

    #[error("Invite code already exists")]
    InviteCodeExists,

    // =========================================================================
    // Business Rule Violations
    // =========================================================================
    #[error("Channel is full")]
    ChannelFull,

    #[error("Channel already has {current} members")]
    CapacityBelowMemberCount { current: i64 },

    #[error("Cannot remove the channel owner")]
    CannotRemoveOwner,

    #[error("Cannot transfer ownership to yourself")]
    CannotTransferToSelf,

    #[error("Invite has already been used")]
    InviteUsed,

    #[error("Invite has expired")]
    InviteExpired,

    #[error("Poll is closed")]
    PollClosed,

    #[error("Message has been deleted")]
    MessageDeleted,

    #[error("Channel is read-only")]
    ReadOnlyChannel,

    // =========================================================================
    // Infrastructure Errors (wrapped)
    // =========================================================================
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Cache error: {0}")]
    CacheError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    /// Get an error code string for API responses
    pub fn code(&self) -> &'static str {
        match self {
            // Not Found
            Self::UserNotFound(_) => "UNKNOWN_USER",
            Self::ChannelNotFound(_) => "UNKNOWN_CHANNEL",
            Self::MessageNotFound(_) => "UNKNOWN_MESSAGE",
            Self::MemberNotFound => "UNKNOWN_MEMBER",
            Self::InviteNotFound(_) => "UNKNOWN_INVITE",
            Self::TaskNotFound(_) => "UNKNOWN_TASK",
            Self::PollNotFound(_) => "UNKNOWN_POLL",

            // Validation
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::InvalidEmail => "INVALID_EMAIL",
            Self::WeakPassword(_) => "WEAK_PASSWORD",
            Self::ContentTooLong { .. } => "CONTENT_TOO_LONG",
            Self::EmptyMessage => "EMPTY_MESSAGE",
            Self::TooManyAttachments { .. } => "TOO_MANY_ATTACHMENTS",
            Self::InvalidEmoji => "INVALID_EMOJI",
            Self::InvalidCapacity { .. } => "INVALID_CAPACITY",
            Self::InvalidPollOptions(_) => "INVALID_POLL_OPTIONS",
            Self::ForeignPollOption => "UNKNOWN_POLL_OPTION",
            Self::InvalidVoteSelection => "INVALID_VOTE_SELECTION",
            Self::InvalidParentMessage => "INVALID_PARENT_MESSAGE",
            Self::CannotAssignOwnerRole => "CANNOT_ASSIGN_OWNER_ROLE",

            // Authorization
            Self::MissingPermission(_) => "MISSING_PERMISSIONS",
            Self::NotChannelOwner => "NOT_CHANNEL_OWNER",
            Self::NotChannelMember => "NOT_CHANNEL_MEMBER",
            Self::NotMessageAuthor => "NOT_MESSAGE_AUTHOR",
            Self::PrivateChannel => "PRIVATE_CHANNEL",
            Self::CannotModifyOwner => "CANNOT_MODIFY_OWNER",
            Self::CannotModifyModerator => "CANNOT_MODIFY_MODERATOR",

            // Conflict
            Self::EmailAlreadyExists => "EMAIL_ALREADY_EXISTS",
            Self::AlreadyMember => "ALREADY_MEMBER",
            Self::ReactionAlreadyExists => "REACTION_ALREADY_EXISTS",
            Self::InviteCodeExists => "INVITE_CODE_EXISTS",

            // Business Rules
            Self::ChannelFull => "CHANNEL_FULL",
            Self::CapacityBelowMemberCount { .. } => "CAPACITY_BELOW_MEMBER_COUNT",
            Self::CannotRemoveOwner => "CANNOT_REMOVE_OWNER",
            Self::CannotTransferToSelf => "CANNOT_TRANSFER_TO_SELF",
            Self::InviteUsed => "INVITE_USED",
            Self::InviteExpired => "INVITE_EXPIRED",
            Self::PollClosed => "POLL_CLOSED",
            Self::MessageDeleted => "MESSAGE_DELETED",
            Self::ReadOnlyChannel => "READ_ONLY_CHANNEL",

            // Infrastructure
            Self::DatabaseError(_) => "DATABASE_ERROR",
            Self::CacheError(_) => "CACHE_ERROR",
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::UserNotFound(_)
                | Self::ChannelNotFound(_)
                | Self::MessageNotFound(_)
                | Self::MemberNotFound
                | Self::InviteNotFound(_)
                | Self::TaskNotFound(_)
                | Self::PollNotFound(_)
        )
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::ValidationError(_)
                | Self::InvalidEmail
                | Self::WeakPassword(_)
                | Self::ContentTooLong { .. }
                | Self::EmptyMessage
                | Self::TooManyAttachments { .. }
                | Self::InvalidEmoji
                | Self::InvalidCapacity { .. }
                | Self::InvalidPollOptions(_)
                | Self::ForeignPollOption
                | Self::InvalidVoteSelection
                | Self::InvalidParentMessage
                | Self::CannotAssignOwnerRole
        )
    }

    /// Check if this is an authorization error
    pub fn is_authorization(&self) -> bool {
        matches!(
            self,
            Self::MissingPermission(_)
                | Self::NotChannelOwner
                | Self::NotChannelMember
                | Self::NotMessageAuthor
                | Self::PrivateChannel
                | Self::CannotModifyOwner
                | Self::CannotModifyModerator
                | Self::ReadOnlyChannel
        )
    }

    /// Check if this is a conflict error
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::EmailAlreadyExists
                | Self::AlreadyMember
                | Self::ReactionAlreadyExists
                | Self::InviteCodeExists
        )
    }

    /// Business rules that the request broke; reported as bad requests
    pub fn is_business_rule(&self) -> bool {
        matches!(
            self,
            Self::ChannelFull
                | Self::CapacityBelowMemberCount { .. }
                | Self::CannotRemoveOwner
                | Self::CannotTransferToSelf
                | Self::InviteUsed
                | Self::InviteExpired
                | Self::PollClosed
                | Self::MessageDeleted
        )
    }

    /// HTTP status this error maps to
    pub fn status_code(&self) -> u16 {
        if self.is_not_found() {
            404
        } else if self.is_authorization() {
            403
        } else if self.is_validation() || self.is_business_rule() {
            400
        } else if self.is_conflict() {
            409
        } else {
            500
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = DomainError::UserNotFound(Snowflake::new(1));
        assert_eq!(err.code(), "UNKNOWN_USER");

        let err = DomainError::MissingPermission("MANAGE_MEMBERS".to_string());
        assert_eq!(err.code(), "MISSING_PERMISSIONS");
    }

    #[test]
    fn test_is_not_found() {
        assert!(DomainError::UserNotFound(Snowflake::new(1)).is_not_found());
        assert!(DomainError::PollNotFound(Snowflake::new(1)).is_not_found());
        assert!(!DomainError::EmailAlreadyExists.is_not_found());
    }

    #[test]
    fn test_is_authorization() {
        assert!(DomainError::NotChannelOwner.is_authorization());
        assert!(DomainError::MissingPermission("test".to_string()).is_authorization());
        assert!(!DomainError::UserNotFound(Snowflake::new(1)).is_authorization());
    }

    #[test]
    fn test_business_rules_are_bad_requests() {
        for err in [
            DomainError::ChannelFull,
            DomainError::InviteUsed,
            DomainError::InviteExpired,
            DomainError::PollClosed,
            DomainError::CannotRemoveOwner,
        ] {
            assert!(err.is_business_rule(), "{err:?}");
            assert_eq!(err.status_code(), 400, "{err:?}");
        }
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(DomainError::ChannelNotFound(Snowflake::new(1)).status_code(), 404);
        assert_eq!(DomainError::NotChannelOwner.status_code(), 403);
        assert_eq!(DomainError::AlreadyMember.status_code(), 409);
        assert_eq!(DomainError::EmptyMessage.status_code(), 400);
        assert_eq!(DomainError::DatabaseError("boom".into()).status_code(), 500);
    }

    #[test]
    fn test_error_display() {
        let err = DomainError::UserNotFound(Snowflake::new(123));
        assert_eq!(err.to_string(), "User not found: 123");

        let err = DomainError::ContentTooLong { max: 4000 };
        assert_eq!(err.to_string(), "Content too long: max 4000 characters");
    }
}

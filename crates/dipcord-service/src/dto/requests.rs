//! Request DTOs for API endpoints
//!
//! All request DTOs implement `Deserialize` and `Validate` for input validation.
//! Snowflake fields accept both strings and numbers.

use chrono::{DateTime, Utc};
use dipcord_core::{AccessSettings, MemberPermissions, MemberRole, Snowflake, TaskStatus};
use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

/// Distinguishes an absent field (`None`) from an explicit `null` (`Some(None)`)
fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

// ============================================================================
// Auth Requests
// ============================================================================

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 64, message = "Name must be 1-64 characters"))]
    pub name: String,

    #[validate(length(min = 1, max = 64, message = "Surname must be 1-64 characters"))]
    pub surname: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 8, max = 128, message = "Password must be 8-128 characters"))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

// ============================================================================
// User Requests
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, max = 64, message = "Name must be 1-64 characters"))]
    pub name: Option<String>,

    #[validate(length(min = 1, max = 64, message = "Surname must be 1-64 characters"))]
    pub surname: Option<String>,
}

// ============================================================================
// Channel Requests
// ============================================================================

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateChannelRequest {
    #[validate(length(min = 1, max = 100, message = "Channel name must be 1-100 characters"))]
    pub name: String,

    #[validate(length(max = 1024, message = "Description must be at most 1024 characters"))]
    pub description: Option<String>,

    #[validate(range(min = 2, max = 1000, message = "max_participants must be 2-1000"))]
    pub max_participants: Option<i32>,

    #[serde(default)]
    pub access_settings: Option<AccessSettings>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateChannelRequest {
    #[validate(length(min = 1, max = 100, message = "Channel name must be 1-100 characters"))]
    pub name: Option<String>,

    /// `null` clears the description
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,

    #[validate(range(min = 2, max = 1000, message = "max_participants must be 2-1000"))]
    pub max_participants: Option<i32>,

    pub access_settings: Option<AccessSettings>,
}

// ============================================================================
// Member Requests
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct AddMemberRequest {
    pub user_id: Snowflake,

    /// Defaults to `user`
    pub role: Option<MemberRole>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateMemberRequest {
    pub role: Option<MemberRole>,

    /// Replaces the member's flags outright
    pub permissions: Option<MemberPermissions>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransferOwnershipRequest {
    pub user_id: Snowflake,
}

// ============================================================================
// Invite Requests
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CreateInviteRequest {
    /// Omitted means the invite never expires
    #[validate(range(min = 60, max = 2_592_000, message = "Expiry must be 60s to 30 days"))]
    pub expires_in_seconds: Option<i64>,
}

// ============================================================================
// Message Requests
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AttachmentRequest {
    #[validate(length(min = 1, max = 255, message = "Filename must be 1-255 characters"))]
    pub filename: String,

    #[validate(url(message = "Attachment url must be a valid URL"))]
    pub url: String,

    #[validate(length(max = 127))]
    pub content_type: Option<String>,

    #[validate(range(min = 0, message = "size_bytes cannot be negative"))]
    #[serde(default)]
    pub size_bytes: i64,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CreateMessageRequest {
    /// May be empty when attachments are present
    #[validate(length(max = 4000, message = "Message must be at most 4000 characters"))]
    #[serde(default)]
    pub content: String,

    pub parent_message_id: Option<Snowflake>,

    #[validate(length(max = 10, message = "At most 10 attachments"), nested)]
    #[serde(default)]
    pub attachments: Vec<AttachmentRequest>,

    /// Users to notify; non-members are dropped
    #[serde(default)]
    pub mentions: Vec<Snowflake>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateMessageRequest {
    #[validate(length(min = 1, max = 4000, message = "Message must be 1-4000 characters"))]
    pub content: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ToggleReactionRequest {
    #[validate(length(min = 1, max = 64, message = "Emoji must be 1-64 characters"))]
    pub emoji: String,
}

// ============================================================================
// Task Requests
// ============================================================================

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateTaskRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,

    #[validate(length(max = 5000, message = "Description must be at most 5000 characters"))]
    pub description: Option<String>,

    /// Column to start in; defaults to `todo`
    pub status: Option<TaskStatus>,

    pub assignee_id: Option<Snowflake>,

    pub due_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateTaskRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: Option<String>,

    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,

    /// `null` unassigns
    #[serde(default, deserialize_with = "double_option")]
    pub assignee_id: Option<Option<Snowflake>>,

    #[serde(default, deserialize_with = "double_option")]
    pub due_date: Option<Option<DateTime<Utc>>>,

    #[validate(range(min = 0))]
    pub position: Option<i32>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateTaskStatusRequest {
    pub status: TaskStatus,

    /// Position in the new column; appended at the end when omitted
    #[validate(range(min = 0))]
    pub position: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskFilter {
    pub status: Option<TaskStatus>,
}

// ============================================================================
// Poll Requests
// ============================================================================

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreatePollRequest {
    #[validate(length(min = 1, max = 300, message = "Question must be 1-300 characters"))]
    pub question: String,

    #[validate(length(min = 2, max = 10, message = "A poll needs 2-10 options"))]
    pub options: Vec<String>,

    #[serde(default)]
    pub allow_multiple: bool,

    pub closes_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct VoteRequest {
    #[validate(length(min = 1, message = "Select at least one option"))]
    pub option_ids: Vec<Snowflake>,
}

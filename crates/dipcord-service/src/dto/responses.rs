//! Response DTOs for API endpoints
//!
//! All response DTOs implement `Serialize` for JSON output.
//! Snowflake IDs serialize as strings for JavaScript compatibility.

use chrono::{DateTime, Utc};
use dipcord_core::{
    AccessSettings, MemberPermissions, MemberRole, ReactionAction, Snowflake, TaskStatus,
};
use serde::Serialize;

// ============================================================================
// Auth Responses
// ============================================================================

/// Authentication response with tokens
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: CurrentUserResponse,
}

// ============================================================================
// User Responses
// ============================================================================

/// What other users get to see
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: Snowflake,
    pub name: String,
    pub surname: String,
    pub display_name: String,
    pub created_at: DateTime<Utc>,
}

/// The authenticated user, including private fields
#[derive(Debug, Clone, Serialize)]
pub struct CurrentUserResponse {
    pub id: Snowflake,
    pub name: String,
    pub surname: String,
    pub email: String,
    pub roles: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ============================================================================
// Channel Responses
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct ChannelResponse {
    pub id: Snowflake,
    pub name: String,
    pub description: Option<String>,
    pub max_participants: i32,
    pub access_settings: AccessSettings,
    pub created_by: Snowflake,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub member_count: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ChannelResponse {
    #[must_use]
    pub fn with_member_count(mut self, count: i64) -> Self {
        self.member_count = Some(count);
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MemberResponse {
    pub channel_id: Snowflake,
    pub user_id: Snowflake,
    pub role: MemberRole,
    pub permissions: MemberPermissions,
    pub joined_at: DateTime<Utc>,
    /// Missing only if the user row vanished underneath us
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserResponse>,
}

// ============================================================================
// Invite Responses
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct InviteResponse {
    pub code: String,
    pub channel_id: Snowflake,
    pub created_by_user_id: Snowflake,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_used: bool,
    pub used_by_user_id: Option<Snowflake>,
    pub used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Channel summary shown to someone holding an invite
#[derive(Debug, Clone, Serialize)]
pub struct InviteChannelResponse {
    pub id: Snowflake,
    pub name: String,
    pub description: Option<String>,
    pub member_count: i64,
    pub max_participants: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct InvitePreviewResponse {
    pub code: String,
    pub channel: InviteChannelResponse,
    pub expires_at: Option<DateTime<Utc>>,
    /// Unused, unexpired and the channel has room
    pub usable: bool,
}

// ============================================================================
// Message Responses
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct AttachmentResponse {
    pub id: Snowflake,
    pub filename: String,
    pub url: String,
    pub content_type: Option<String>,
    pub size_bytes: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReactionResponse {
    pub emoji: String,
    pub count: i64,
    pub me: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub id: Snowflake,
    pub channel_id: Snowflake,
    pub user_id: Snowflake,
    pub author: Option<UserResponse>,
    /// `null` once the message is deleted
    pub content: Option<String>,
    pub parent_message_id: Option<Snowflake>,
    pub is_edited: bool,
    pub is_deleted: bool,
    pub attachments: Vec<AttachmentResponse>,
    pub mentions: Vec<Snowflake>,
    pub reactions: Vec<ReactionResponse>,
    pub reply_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Result of toggling a reaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReactionToggleResponse {
    pub action: ReactionAction,
    pub emoji: String,
    /// Count for this emoji after the toggle
    pub count: i64,
}

// ============================================================================
// Task Responses
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct TaskResponse {
    pub id: Snowflake,
    pub channel_id: Snowflake,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub assignee_id: Option<Snowflake>,
    pub created_by: Snowflake,
    pub due_date: Option<DateTime<Utc>>,
    pub position: i32,
    pub is_overdue: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ============================================================================
// Poll Responses
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct PollOptionResponse {
    pub id: Snowflake,
    pub text: String,
    pub position: i32,
    pub votes: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PollResponse {
    pub id: Snowflake,
    pub channel_id: Snowflake,
    pub created_by: Snowflake,
    pub question: String,
    pub allow_multiple: bool,
    pub closes_at: Option<DateTime<Utc>>,
    pub is_closed: bool,
    /// Accepting votes right now
    pub is_open: bool,
    pub options: Vec<PollOptionResponse>,
    /// Options the requester picked
    pub my_votes: Vec<Snowflake>,
    pub total_voters: i64,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Health Responses
// ============================================================================

/// Basic health check response
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: Utc::now(),
        }
    }
}

/// Readiness check response
#[derive(Debug, Clone, Serialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub checks: HealthChecks,
}

/// Health check status for each backing service
#[derive(Debug, Clone, Serialize)]
pub struct HealthChecks {
    pub database: String,
    pub redis: String,
}

impl ReadinessResponse {
    pub fn ready(database_healthy: bool, redis_healthy: bool) -> Self {
        let status = |healthy: bool| if healthy { "healthy" } else { "unhealthy" }.to_string();
        Self {
            status: if database_healthy && redis_healthy {
                "ready"
            } else {
                "not_ready"
            }
            .to_string(),
            timestamp: Utc::now(),
            checks: HealthChecks {
                database: status(database_healthy),
                redis: status(redis_healthy),
            },
        }
    }

    pub fn is_ready(&self) -> bool {
        self.status == "ready"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reaction_toggle_serialization() {
        let response = ReactionToggleResponse {
            action: ReactionAction::Remove,
            emoji: "👍".to_string(),
            count: 0,
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["action"], "remove");
        assert_eq!(json["count"], 0);
    }

    #[test]
    fn test_channel_member_count_is_optional() {
        let channel = ChannelResponse {
            id: Snowflake::new(1),
            name: "general".to_string(),
            description: None,
            max_participants: 10,
            access_settings: AccessSettings::public(),
            created_by: Snowflake::new(2),
            member_count: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_value(&channel).unwrap();
        assert!(json.get("member_count").is_none());
        assert_eq!(json["id"], "1");

        let json = serde_json::to_value(channel.with_member_count(3)).unwrap();
        assert_eq!(json["member_count"], 3);
    }

    #[test]
    fn test_health_response() {
        let health = HealthResponse::healthy();
        assert_eq!(health.status, "healthy");
    }

    #[test]
    fn test_readiness_response() {
        let ready = ReadinessResponse::ready(true, true);
        assert!(ready.is_ready());
        assert_eq!(ready.checks.database, "healthy");

        let not_ready = ReadinessResponse::ready(true, false);
        assert_eq!(not_ready.status, "not_ready");
        assert_eq!(not_ready.checks.redis, "unhealthy");
    }
}

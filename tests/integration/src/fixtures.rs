//! Request bodies and response shapes used by the end-to-end tests
//!
//! Ids are kept as strings, which is how the API serializes snowflakes.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

static COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique across processes too, since the database outlives a test run
pub fn unique_suffix() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    format!("{nanos}{}", COUNTER.fetch_add(1, Ordering::SeqCst))
}

// ============================================================================
// Auth
// ============================================================================

#[derive(Debug, Serialize)]
pub struct RegisterRequest {
    pub name: String,
    pub surname: String,
    pub email: String,
    pub password: String,
}

impl RegisterRequest {
    pub fn unique() -> Self {
        let suffix = unique_suffix();
        Self {
            name: "Test".to_string(),
            surname: format!("User{suffix}"),
            email: format!("test{suffix}@example.com"),
            password: "TestPass123!".to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn from_register(reg: &RegisterRequest) -> Self {
        Self {
            email: reg.email.clone(),
            password: reg.password.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

#[derive(Debug, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: CurrentUserResponse,
}

#[derive(Debug, Deserialize)]
pub struct CurrentUserResponse {
    pub id: String,
    pub name: String,
    pub surname: String,
    pub email: String,
}

// ============================================================================
// Channels and members
// ============================================================================

#[derive(Debug, Serialize)]
pub struct AccessSettings {
    pub is_private: bool,
    pub read_only: bool,
    pub allow_member_invites: bool,
}

#[derive(Debug, Serialize)]
pub struct CreateChannelRequest {
    pub name: String,
    pub description: Option<String>,
    pub access_settings: AccessSettings,
}

impl CreateChannelRequest {
    pub fn public() -> Self {
        Self::with_privacy(false)
    }

    pub fn private() -> Self {
        Self::with_privacy(true)
    }

    fn with_privacy(is_private: bool) -> Self {
        Self {
            name: format!("channel-{}", unique_suffix()),
            description: Some("Integration test channel".to_string()),
            access_settings: AccessSettings {
                is_private,
                read_only: false,
                allow_member_invites: false,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ChannelResponse {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub created_by: String,
    pub member_count: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct MemberResponse {
    pub channel_id: String,
    pub user_id: String,
    pub role: String,
}

#[derive(Debug, Deserialize)]
pub struct InviteResponse {
    pub code: String,
    pub channel_id: String,
    pub is_used: bool,
}

// ============================================================================
// Messages
// ============================================================================

#[derive(Debug, Serialize)]
pub struct CreateMessageRequest {
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_message_id: Option<String>,
}

impl CreateMessageRequest {
    pub fn simple(content: &str) -> Self {
        Self {
            content: content.to_string(),
            parent_message_id: None,
        }
    }

    pub fn reply(content: &str, parent_id: &str) -> Self {
        Self {
            content: content.to_string(),
            parent_message_id: Some(parent_id.to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ReactionResponse {
    pub emoji: String,
    pub count: i64,
    pub me: bool,
}

#[derive(Debug, Deserialize)]
pub struct MessageResponse {
    pub id: String,
    pub channel_id: String,
    pub user_id: String,
    pub content: Option<String>,
    pub parent_message_id: Option<String>,
    pub is_edited: bool,
    pub is_deleted: bool,
    pub reactions: Vec<ReactionResponse>,
    pub reply_count: i64,
}

#[derive(Debug, Deserialize)]
pub struct ReactionToggleResponse {
    pub action: String,
    pub emoji: String,
    pub count: i64,
}

// ============================================================================
// Tasks and polls
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct TaskResponse {
    pub id: String,
    pub title: String,
    pub status: String,
    pub assignee_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PollOptionResponse {
    pub id: String,
    pub text: String,
    pub votes: i64,
}

#[derive(Debug, Deserialize)]
pub struct PollResponse {
    pub id: String,
    pub question: String,
    pub is_closed: bool,
    pub options: Vec<PollOptionResponse>,
    pub my_votes: Vec<String>,
    pub total_voters: i64,
}

//! ChannelInvite entity - a single-use code granting membership

use chrono::{DateTime, Duration, Utc};

use crate::value_objects::Snowflake;

/// Length of generated invite codes
pub const INVITE_CODE_LEN: usize = 10;

/// Invite entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelInvite {
    pub id: Snowflake,
    pub code: String,
    pub channel_id: Snowflake,
    pub created_by_user_id: Snowflake,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_used: bool,
    pub used_by_user_id: Option<Snowflake>,
    pub used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl ChannelInvite {
    pub fn new(
        id: Snowflake,
        code: String,
        channel_id: Snowflake,
        created_by_user_id: Snowflake,
    ) -> Self {
        Self {
            id,
            code,
            channel_id,
            created_by_user_id,
            expires_at: None,
            is_used: false,
            used_by_user_id: None,
            used_at: None,
            created_at: Utc::now(),
        }
    }

    /// Non-positive values mean "never expires".
    #[must_use]
    pub fn expiring_in(mut self, seconds: i64) -> Self {
        self.expires_at = (seconds > 0).then(|| self.created_at + Duration::seconds(seconds));
        self
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| Utc::now() >= at)
    }

    /// Unused and unexpired
    pub fn is_usable(&self) -> bool {
        !self.is_used && !self.is_expired()
    }

    pub fn mark_used(&mut self, user_id: Snowflake) {
        self.is_used = true;
        self.used_by_user_id = Some(user_id);
        self.used_at = Some(Utc::now());
    }
}

/// Random alphanumeric invite code
pub fn generate_invite_code() -> String {
    use rand::Rng;

    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

    let mut rng = rand::thread_rng();
    (0..INVITE_CODE_LEN)
        .map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char)
        .collect()
}

//! Channel access settings, persisted as a JSONB column.

use serde::{Deserialize, Serialize};

/// How a channel may be discovered, joined and written to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessSettings {
    /// Private channels are hidden from discovery and can only be entered by invite
    /// or by being added by a member with authority.
    pub is_private: bool,
    /// Only the owner and moderators may post.
    pub read_only: bool,
    /// Plain members may create invites without `MANAGE_INVITES`.
    pub allow_member_invites: bool,
}

impl Default for AccessSettings {
    fn default() -> Self {
        Self {
            is_private: true,
            read_only: false,
            allow_member_invites: false,
        }
    }
}

impl AccessSettings {
    pub fn public() -> Self {
        Self {
            is_private: false,
            ..Self::default()
        }
    }

    #[inline]
    pub fn is_public(&self) -> bool {
        !self.is_private
    }
}

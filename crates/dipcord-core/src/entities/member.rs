//! ChannelMember entity - a user's membership in a channel

use chrono::{DateTime, Utc};

use crate::value_objects::{MemberPermissions, MemberRole, Snowflake};

/// Membership row. `(channel_id, user_id)` is the key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelMember {
    pub channel_id: Snowflake,
    pub user_id: Snowflake,
    pub role: MemberRole,
    pub permissions: MemberPermissions,
    pub joined_at: DateTime<Utc>,
}

impl ChannelMember {
    /// New membership carrying the role's default permission bundle
    pub fn new(channel_id: Snowflake, user_id: Snowflake, role: MemberRole) -> Self {
        Self {
            channel_id,
            user_id,
            role,
            permissions: role.default_permissions(),
            joined_at: Utc::now(),
        }
    }

    #[inline]
    pub fn is_owner(&self) -> bool {
        self.role == MemberRole::Owner
    }

    #[inline]
    pub fn is_moderator(&self) -> bool {
        self.role == MemberRole::Moderator
    }

    /// Owner or moderator
    #[inline]
    pub fn is_privileged(&self) -> bool {
        matches!(self.role, MemberRole::Owner | MemberRole::Moderator)
    }

    /// The owner always passes; everyone else needs the flag.
    pub fn can(&self, permission: MemberPermissions) -> bool {
        self.is_owner() || self.permissions.contains(permission)
    }

    pub fn can_manage_members(&self) -> bool {
        self.is_privileged() || self.can(MemberPermissions::MANAGE_MEMBERS)
    }

    pub fn can_manage_invites(&self) -> bool {
        self.is_privileged() || self.can(MemberPermissions::MANAGE_INVITES)
    }

    /// Switch role. Permissions reset to the new role's bundle.
    pub fn set_role(&mut self, role: MemberRole) {
        self.role = role;
        self.permissions = role.default_permissions();
    }
}

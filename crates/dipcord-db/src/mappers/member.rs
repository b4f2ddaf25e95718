//! ChannelMember entity <-> model mapper

use dipcord_core::{ChannelMember, MemberPermissions, MemberRole, Snowflake};

use crate::models::MemberModel;

/// Unknown roles degrade to a plain user
pub fn role_from_str(role: &str) -> MemberRole {
    MemberRole::parse(role).unwrap_or(MemberRole::User)
}

impl From<MemberModel> for ChannelMember {
    fn from(model: MemberModel) -> Self {
        ChannelMember {
            channel_id: Snowflake::new(model.channel_id),
            user_id: Snowflake::new(model.user_id),
            role: role_from_str(&model.role),
            permissions: MemberPermissions::from_i64(model.permissions),
            joined_at: model.joined_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_member_from_model() {
        let model = MemberModel {
            channel_id: 1,
            user_id: 2,
            role: "moderator".to_string(),
            permissions: MemberPermissions::MANAGE_MEMBERS.to_i64(),
            joined_at: Utc::now(),
        };
        let member = ChannelMember::from(model);
        assert_eq!(member.role, MemberRole::Moderator);
        assert_eq!(member.permissions, MemberPermissions::MANAGE_MEMBERS);
    }

    #[test]
    fn test_unknown_role_is_user() {
        assert_eq!(role_from_str("superadmin"), MemberRole::User);
        assert_eq!(role_from_str("owner"), MemberRole::Owner);
    }
}

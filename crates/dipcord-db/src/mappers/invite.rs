//! ChannelInvite entity <-> model mapper

use dipcord_core::{ChannelInvite, Snowflake};

use crate::models::InviteModel;

impl From<InviteModel> for ChannelInvite {
    fn from(model: InviteModel) -> Self {
        ChannelInvite {
            id: Snowflake::new(model.id),
            code: model.code,
            channel_id: Snowflake::new(model.channel_id),
            created_by_user_id: Snowflake::new(model.created_by_user_id),
            expires_at: model.expires_at,
            is_used: model.is_used,
            used_by_user_id: model.used_by_user_id.map(Snowflake::new),
            used_at: model.used_at,
            created_at: model.created_at,
        }
    }
}

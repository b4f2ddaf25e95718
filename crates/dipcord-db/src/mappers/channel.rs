//! Channel entity <-> model mapper

use dipcord_core::{Channel, Snowflake};

use crate::models::{ChannelModel, ChannelWithCountModel};

impl From<ChannelModel> for Channel {
    fn from(model: ChannelModel) -> Self {
        Channel {
            id: Snowflake::new(model.id),
            name: model.name,
            description: model.description,
            max_participants: model.max_participants,
            access: model.access_settings.0,
            created_by: Snowflake::new(model.created_by),
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<ChannelWithCountModel> for (Channel, i64) {
    fn from(model: ChannelWithCountModel) -> Self {
        (Channel::from(model.channel), model.member_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use dipcord_core::AccessSettings;
    use sqlx::types::Json;

    #[test]
    fn test_channel_from_model() {
        let now = Utc::now();
        let model = ChannelModel {
            id: 10,
            name: "design".to_string(),
            description: Some("UI work".to_string()),
            max_participants: 25,
            access_settings: Json(AccessSettings::public()),
            created_by: 3,
            created_at: now,
            updated_at: now,
        };

        let channel = Channel::from(model);
        assert_eq!(channel.id, Snowflake::new(10));
        assert_eq!(channel.max_participants, 25);
        assert!(channel.is_public());
        assert_eq!(channel.created_by, Snowflake::new(3));
    }
}

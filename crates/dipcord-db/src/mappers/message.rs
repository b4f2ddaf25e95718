//! Message entity <-> model mapper

use dipcord_core::{Message, MessageAttachment, MessageMention, Snowflake};

use crate::models::{AttachmentModel, MentionModel, MessageModel};

impl From<MessageModel> for Message {
    fn from(model: MessageModel) -> Self {
        Message {
            id: Snowflake::new(model.id),
            channel_id: Snowflake::new(model.channel_id),
            user_id: Snowflake::new(model.user_id),
            content: model.content,
            parent_message_id: model.parent_message_id.map(Snowflake::new),
            is_edited: model.is_edited,
            is_deleted: model.is_deleted,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<AttachmentModel> for MessageAttachment {
    fn from(model: AttachmentModel) -> Self {
        MessageAttachment {
            id: Snowflake::new(model.id),
            message_id: Snowflake::new(model.message_id),
            filename: model.filename,
            url: model.url,
            content_type: model.content_type,
            size_bytes: model.size_bytes,
        }
    }
}

impl From<MentionModel> for MessageMention {
    fn from(model: MentionModel) -> Self {
        MessageMention {
            message_id: Snowflake::new(model.message_id),
            user_id: Snowflake::new(model.user_id),
        }
    }
}

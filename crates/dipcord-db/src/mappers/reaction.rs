//! Reaction entity <-> model mapper

use dipcord_core::{MessageReaction, ReactionSummary, Snowflake};

use crate::models::{ReactionCountModel, ReactionModel};

impl From<ReactionModel> for MessageReaction {
    fn from(model: ReactionModel) -> Self {
        MessageReaction {
            message_id: Snowflake::new(model.message_id),
            user_id: Snowflake::new(model.user_id),
            emoji: model.emoji,
            created_at: model.created_at,
        }
    }
}

impl From<ReactionCountModel> for ReactionSummary {
    fn from(model: ReactionCountModel) -> Self {
        ReactionSummary::new(model.emoji, model.count, model.me)
    }
}

//! Poll entity <-> model mapper

use dipcord_core::{Poll, PollOption, PollVote, Snowflake};

use crate::models::{PollModel, PollOptionModel, PollVoteModel};

impl From<PollModel> for Poll {
    fn from(model: PollModel) -> Self {
        Poll {
            id: Snowflake::new(model.id),
            channel_id: Snowflake::new(model.channel_id),
            created_by: Snowflake::new(model.created_by),
            question: model.question,
            allow_multiple: model.allow_multiple,
            closes_at: model.closes_at,
            is_closed: model.is_closed,
            created_at: model.created_at,
        }
    }
}

impl From<PollOptionModel> for PollOption {
    fn from(model: PollOptionModel) -> Self {
        PollOption {
            id: Snowflake::new(model.id),
            poll_id: Snowflake::new(model.poll_id),
            text: model.text,
            position: model.position,
        }
    }
}

impl From<PollVoteModel> for PollVote {
    fn from(model: PollVoteModel) -> Self {
        PollVote {
            poll_id: Snowflake::new(model.poll_id),
            option_id: Snowflake::new(model.option_id),
            user_id: Snowflake::new(model.user_id),
        }
    }
}

//! Realtime events - "something changed, refetch" notifications
//!
//! Events carry ids only. Clients react by refetching the affected resource
//! through the REST API, so ordering between events is not guaranteed and
//! does not need to be.
//!
//! On the wire an event is `{"type": "message:created", "data": {...}}`.

use serde::{Deserialize, Serialize};

use crate::entities::TaskStatus;
use crate::value_objects::Snowflake;

/// Who should receive an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventTarget {
    /// Everyone subscribed to the channel
    Channel(Snowflake),
    /// Every connection of a single user
    User(Snowflake),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReactionAction {
    Add,
    Remove,
}

impl ReactionAction {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Remove => "remove",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum RealtimeEvent {
    // Messages
    #[serde(rename = "message:created")]
    MessageCreated {
        channel_id: Snowflake,
        message_id: Snowflake,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        parent_message_id: Option<Snowflake>,
    },
    #[serde(rename = "message:updated")]
    MessageUpdated {
        channel_id: Snowflake,
        message_id: Snowflake,
    },
    #[serde(rename = "message:deleted")]
    MessageDeleted {
        channel_id: Snowflake,
        message_id: Snowflake,
    },
    #[serde(rename = "reaction:updated")]
    ReactionUpdated {
        channel_id: Snowflake,
        message_id: Snowflake,
        user_id: Snowflake,
        emoji: String,
        action: ReactionAction,
    },
    #[serde(rename = "mention:created")]
    MentionCreated {
        user_id: Snowflake,
        channel_id: Snowflake,
        message_id: Snowflake,
        author_id: Snowflake,
    },

    // Membership
    #[serde(rename = "member:added")]
    MemberAdded {
        channel_id: Snowflake,
        user_id: Snowflake,
    },
    #[serde(rename = "member:updated")]
    MemberUpdated {
        channel_id: Snowflake,
        user_id: Snowflake,
    },
    #[serde(rename = "member:removed")]
    MemberRemoved {
        channel_id: Snowflake,
        user_id: Snowflake,
    },

    // Channels
    #[serde(rename = "channel:updated")]
    ChannelUpdated { channel_id: Snowflake },
    #[serde(rename = "channel:deleted")]
    ChannelDeleted { channel_id: Snowflake },
    #[serde(rename = "channel:joined")]
    ChannelJoined {
        user_id: Snowflake,
        channel_id: Snowflake,
    },

    // Invites
    #[serde(rename = "invite:created")]
    InviteCreated { channel_id: Snowflake, code: String },
    #[serde(rename = "invite:revoked")]
    InviteRevoked { channel_id: Snowflake, code: String },

    // Tasks
    #[serde(rename = "task:created")]
    TaskCreated {
        channel_id: Snowflake,
        task_id: Snowflake,
    },
    #[serde(rename = "task:updated")]
    TaskUpdated {
        channel_id: Snowflake,
        task_id: Snowflake,
    },
    #[serde(rename = "task:status")]
    TaskStatusChanged {
        channel_id: Snowflake,
        task_id: Snowflake,
        old_status: TaskStatus,
        new_status: TaskStatus,
    },
    #[serde(rename = "task:deleted")]
    TaskDeleted {
        channel_id: Snowflake,
        task_id: Snowflake,
    },

    // Polls
    #[serde(rename = "poll:created")]
    PollCreated {
        channel_id: Snowflake,
        poll_id: Snowflake,
    },
    #[serde(rename = "poll:voted")]
    PollVoted {
        channel_id: Snowflake,
        poll_id: Snowflake,
    },
    #[serde(rename = "poll:closed")]
    PollClosed {
        channel_id: Snowflake,
        poll_id: Snowflake,
    },

    // Typing
    #[serde(rename = "typing:start")]
    TypingStart {
        channel_id: Snowflake,
        user_id: Snowflake,
    },
    #[serde(rename = "typing:stop")]
    TypingStop {
        channel_id: Snowflake,
        user_id: Snowflake,
    },
}

impl RealtimeEvent {
    /// Wire name, e.g. `message:created`
    pub fn name(&self) -> &'static str {
        match self {
            Self::MessageCreated { .. } => "message:created",
            Self::MessageUpdated { .. } => "message:updated",
            Self::MessageDeleted { .. } => "message:deleted",
            Self::ReactionUpdated { .. } => "reaction:updated",
            Self::MentionCreated { .. } => "mention:created",
            Self::MemberAdded { .. } => "member:added",
            Self::MemberUpdated { .. } => "member:updated",
            Self::MemberRemoved { .. } => "member:removed",
            Self::ChannelUpdated { .. } => "channel:updated",
            Self::ChannelDeleted { .. } => "channel:deleted",
            Self::ChannelJoined { .. } => "channel:joined",
            Self::InviteCreated { .. } => "invite:created",
            Self::InviteRevoked { .. } => "invite:revoked",
            Self::TaskCreated { .. } => "task:created",
            Self::TaskUpdated { .. } => "task:updated",
            Self::TaskStatusChanged { .. } => "task:status",
            Self::TaskDeleted { .. } => "task:deleted",
            Self::PollCreated { .. } => "poll:created",
            Self::PollVoted { .. } => "poll:voted",
            Self::PollClosed { .. } => "poll:closed",
            Self::TypingStart { .. } => "typing:start",
            Self::TypingStop { .. } => "typing:stop",
        }
    }

    pub fn target(&self) -> EventTarget {
        match self {
            Self::MentionCreated { user_id, .. } | Self::ChannelJoined { user_id, .. } => {
                EventTarget::User(*user_id)
            }
            Self::MessageCreated { channel_id, .. }
            | Self::MessageUpdated { channel_id, .. }
            | Self::MessageDeleted { channel_id, .. }
            | Self::ReactionUpdated { channel_id, .. }
            | Self::MemberAdded { channel_id, .. }
            | Self::MemberUpdated { channel_id, .. }
            | Self::MemberRemoved { channel_id, .. }
            | Self::ChannelUpdated { channel_id }
            | Self::ChannelDeleted { channel_id }
            | Self::InviteCreated { channel_id, .. }
            | Self::InviteRevoked { channel_id, .. }
            | Self::TaskCreated { channel_id, .. }
            | Self::TaskUpdated { channel_id, .. }
            | Self::TaskStatusChanged { channel_id, .. }
            | Self::TaskDeleted { channel_id, .. }
            | Self::PollCreated { channel_id, .. }
            | Self::PollVoted { channel_id, .. }
            | Self::PollClosed { channel_id, .. }
            | Self::TypingStart { channel_id, .. }
            | Self::TypingStop { channel_id, .. } => EventTarget::Channel(*channel_id),
        }
    }

    /// The `data` half of the wire form
    pub fn payload(&self) -> serde_json::Value {
        match serde_json::to_value(self) {
            Ok(serde_json::Value::Object(mut map)) => {
                map.remove("data").unwrap_or(serde_json::Value::Null)
            }
            _ => serde_json::Value::Null,
        }
    }

    /// Rebuild an event from its wire name and payload
    pub fn from_parts(name: &str, data: serde_json::Value) -> Option<Self> {
        serde_json::from_value(serde_json::json!({ "type": name, "data": data })).ok()
    }
}

//! Pub/Sub channel naming.
//!
//! `channel:{id}` carries events for everyone subscribed to a chat channel,
//! `user:{id}` carries events addressed to one user, and `broadcast` reaches
//! every gateway connection.

use dipcord_core::{EventTarget, Snowflake};

pub const CHANNEL_PREFIX: &str = "channel:";
pub const USER_CHANNEL_PREFIX: &str = "user:";
pub const BROADCAST_CHANNEL: &str = "broadcast";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PubSubChannel {
    Channel(Snowflake),
    User(Snowflake),
    Broadcast,
}

impl PubSubChannel {
    #[must_use]
    pub fn channel(channel_id: Snowflake) -> Self {
        Self::Channel(channel_id)
    }

    #[must_use]
    pub fn user(user_id: Snowflake) -> Self {
        Self::User(user_id)
    }

    /// Redis channel name
    #[must_use]
    pub fn name(&self) -> String {
        match self {
            Self::Channel(id) => format!("{CHANNEL_PREFIX}{id}"),
            Self::User(id) => format!("{USER_CHANNEL_PREFIX}{id}"),
            Self::Broadcast => BROADCAST_CHANNEL.to_string(),
        }
    }

    /// Inverse of [`name`](Self::name). Unknown names yield `None`.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        if name == BROADCAST_CHANNEL {
            return Some(Self::Broadcast);
        }

        if let Some(id) = name.strip_prefix(CHANNEL_PREFIX) {
            return id.parse::<i64>().ok().map(|id| Self::Channel(Snowflake::new(id)));
        }

        name.strip_prefix(USER_CHANNEL_PREFIX)
            .and_then(|id| id.parse::<i64>().ok())
            .map(|id| Self::User(Snowflake::new(id)))
    }
}

impl From<EventTarget> for PubSubChannel {
    fn from(target: EventTarget) -> Self {
        match target {
            EventTarget::Channel(id) => Self::Channel(id),
            EventTarget::User(id) => Self::User(id),
        }
    }
}

impl std::fmt::Display for PubSubChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_names() {
        assert_eq!(PubSubChannel::channel(Snowflake::new(67890)).name(), "channel:67890");
        assert_eq!(PubSubChannel::user(Snowflake::new(11111)).name(), "user:11111");
        assert_eq!(PubSubChannel::Broadcast.name(), "broadcast");
    }

    #[test]
    fn test_channel_parse() {
        assert_eq!(
            PubSubChannel::parse("channel:67890"),
            Some(PubSubChannel::Channel(Snowflake::new(67890)))
        );
        assert_eq!(
            PubSubChannel::parse("user:11111"),
            Some(PubSubChannel::User(Snowflake::new(11111)))
        );
        assert_eq!(PubSubChannel::parse("broadcast"), Some(PubSubChannel::Broadcast));
        assert_eq!(PubSubChannel::parse("channel:abc"), None);
        assert_eq!(PubSubChannel::parse("room:1"), None);
    }

    #[test]
    fn test_from_event_target() {
        let id = Snowflake::new(5);
        assert_eq!(
            PubSubChannel::from(EventTarget::Channel(id)),
            PubSubChannel::Channel(id)
        );
        assert_eq!(PubSubChannel::from(EventTarget::User(id)), PubSubChannel::User(id));
    }
}

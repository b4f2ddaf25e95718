//! Channel entity - a chat room with its own membership

use chrono::{DateTime, Utc};

use crate::value_objects::{AccessSettings, Snowflake};

/// Channel entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Channel {
    pub id: Snowflake,
    pub name: String,
    pub description: Option<String>,
    pub max_participants: i32,
    pub access: AccessSettings,
    pub created_by: Snowflake,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Channel {
    pub const MIN_PARTICIPANTS: i32 = 2;
    pub const MAX_PARTICIPANTS: i32 = 1000;
    pub const DEFAULT_PARTICIPANTS: i32 = 50;

    pub fn new(id: Snowflake, name: String, created_by: Snowflake) -> Self {
        let now = Utc::now();
        Self {
            id,
            name,
            description: None,
            max_participants: Self::DEFAULT_PARTICIPANTS,
            access: AccessSettings::default(),
            created_by,
            created_at: now,
            updated_at: now,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    #[must_use]
    pub fn with_max_participants(mut self, max: i32) -> Self {
        self.max_participants = max;
        self
    }

    #[must_use]
    pub fn with_access(mut self, access: AccessSettings) -> Self {
        self.access = access;
        self
    }

    /// True when one more member fits
    #[inline]
    pub fn has_capacity(&self, current_members: i64) -> bool {
        current_members < i64::from(self.max_participants)
    }

    #[inline]
    pub fn is_valid_capacity(max: i32) -> bool {
        (Self::MIN_PARTICIPANTS..=Self::MAX_PARTICIPANTS).contains(&max)
    }

    #[inline]
    pub fn is_public(&self) -> bool {
        self.access.is_public()
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity() {
        let channel = Channel::new(Snowflake::new(1), "team".to_string(), Snowflake::new(2))
            .with_max_participants(2);
        assert!(channel.has_capacity(0));
        assert!(channel.has_capacity(1));
        assert!(!channel.has_capacity(2));
        assert!(!channel.has_capacity(3));
    }

    #[test]
    fn test_capacity_bounds() {
        assert!(!Channel::is_valid_capacity(1));
        assert!(Channel::is_valid_capacity(2));
        assert!(Channel::is_valid_capacity(1000));
        assert!(!Channel::is_valid_capacity(1001));
    }

    #[test]
    fn test_defaults_to_private() {
        let channel = Channel::new(Snowflake::new(1), "team".to_string(), Snowflake::new(2));
        assert!(!channel.is_public());
        assert_eq!(channel.max_participants, Channel::DEFAULT_PARTICIPANTS);

        let channel = channel.with_access(AccessSettings::public());
        assert!(channel.is_public());
    }
}

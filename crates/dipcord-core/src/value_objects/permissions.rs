//! Channel member permissions and roles.
//!
//! Each membership row stores a role (owner / moderator / user) and a bitfield
//! of permission flags. The role decides the default bundle a member gets when
//! they join; the bundle can be edited afterwards by someone with authority.

use bitflags::bitflags;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

bitflags! {
    /// Per-member permission flags, stored as BIGINT.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct MemberPermissions: u64 {
        const SEND_MESSAGES    = 1 << 0;
        const ADD_REACTIONS    = 1 << 1;
        const ATTACH_FILES     = 1 << 2;
        /// Mention every member of the channel at once
        const MENTION_EVERYONE = 1 << 3;
        const CREATE_TASKS     = 1 << 4;
        const CREATE_POLLS     = 1 << 5;
        /// Delete other members' messages, close other members' polls
        const MANAGE_MESSAGES  = 1 << 6;
        /// Add, remove and edit members
        const MANAGE_MEMBERS   = 1 << 7;
        /// Create, list and revoke invites
        const MANAGE_INVITES   = 1 << 8;
        /// Edit or delete anyone's tasks
        const MANAGE_TASKS     = 1 << 9;
        /// Rename the channel, change capacity and access settings
        const MANAGE_CHANNEL   = 1 << 10;

        const USER_DEFAULT = Self::SEND_MESSAGES.bits()
            | Self::ADD_REACTIONS.bits()
            | Self::ATTACH_FILES.bits()
            | Self::CREATE_TASKS.bits()
            | Self::CREATE_POLLS.bits();

        const MODERATOR_DEFAULT = Self::USER_DEFAULT.bits()
            | Self::MENTION_EVERYONE.bits()
            | Self::MANAGE_MESSAGES.bits()
            | Self::MANAGE_MEMBERS.bits()
            | Self::MANAGE_INVITES.bits()
            | Self::MANAGE_TASKS.bits();
    }
}

impl MemberPermissions {
    #[inline]
    pub fn to_i64(self) -> i64 {
        self.bits() as i64
    }

    /// Unknown bits coming from the database are dropped.
    #[inline]
    pub fn from_i64(bits: i64) -> Self {
        Self::from_bits_truncate(bits as u64)
    }

    /// Names of every single flag that is set, in bit order
    ///
    /// Lookup goes the other way through the generated `from_name`.
    pub fn list(&self) -> Vec<&'static str> {
        self.iter_names().map(|(name, _)| name).collect()
    }
}

impl Default for MemberPermissions {
    fn default() -> Self {
        Self::USER_DEFAULT
    }
}

impl fmt::Display for MemberPermissions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.bits())
    }
}

impl Serialize for MemberPermissions {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.bits())
    }
}

impl<'de> Deserialize<'de> for MemberPermissions {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        use serde::de::{self, Visitor};

        struct BitsVisitor;

        impl Visitor<'_> for BitsVisitor {
            type Value = MemberPermissions;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("permission bits as a string or integer")
            }

            fn visit_u64<E: de::Error>(self, value: u64) -> Result<MemberPermissions, E> {
                Ok(MemberPermissions::from_bits_truncate(value))
            }

            fn visit_i64<E: de::Error>(self, value: i64) -> Result<MemberPermissions, E> {
                u64::try_from(value)
                    .map(MemberPermissions::from_bits_truncate)
                    .map_err(|_| E::custom("permission bits cannot be negative"))
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<MemberPermissions, E> {
                value
                    .parse::<u64>()
                    .map(MemberPermissions::from_bits_truncate)
                    .map_err(|_| E::custom("invalid permissions string"))
            }
        }

        deserializer.deserialize_any(BitsVisitor)
    }
}

/// Role of a member inside a channel. Exactly one member per channel is `Owner`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberRole {
    Owner,
    Moderator,
    User,
}

impl MemberRole {
    /// Permission bundle a member receives when given this role
    pub fn default_permissions(self) -> MemberPermissions {
        match self {
            Self::Owner => MemberPermissions::all(),
            Self::Moderator => MemberPermissions::MODERATOR_DEFAULT,
            Self::User => MemberPermissions::USER_DEFAULT,
        }
    }

    /// Higher rank outranks lower rank
    pub const fn rank(self) -> u8 {
        match self {
            Self::Owner => 2,
            Self::Moderator => 1,
            Self::User => 0,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Moderator => "moderator",
            Self::User => "user",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "owner" => Some(Self::Owner),
            "moderator" => Some(Self::Moderator),
            "user" => Some(Self::User),
            _ => None,
        }
    }
}

impl fmt::Display for MemberRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_bundles_are_nested() {
        let user = MemberRole::User.default_permissions();
        let moderator = MemberRole::Moderator.default_permissions();
        let owner = MemberRole::Owner.default_permissions();

        assert!(moderator.contains(user));
        assert!(owner.contains(moderator));
        assert!(!user.contains(MemberPermissions::MANAGE_MEMBERS));
        assert!(moderator.contains(MemberPermissions::MANAGE_MEMBERS));
        assert!(!moderator.contains(MemberPermissions::MANAGE_CHANNEL));
        assert!(owner.contains(MemberPermissions::MANAGE_CHANNEL));
    }

    #[test]
    fn serializes_as_decimal_string() {
        let perms = MemberPermissions::SEND_MESSAGES | MemberPermissions::ATTACH_FILES;
        assert_eq!(serde_json::to_string(&perms).unwrap(), "\"5\"");

        let parsed: MemberPermissions = serde_json::from_str("\"5\"").unwrap();
        assert_eq!(parsed, perms);
        let parsed: MemberPermissions = serde_json::from_str("5").unwrap();
        assert_eq!(parsed, perms);
        assert!(serde_json::from_str::<MemberPermissions>("-1").is_err());
    }

    #[test]
    fn unknown_bits_are_truncated() {
        let perms = MemberPermissions::from_i64(1 << 40 | 1);
        assert_eq!(perms, MemberPermissions::SEND_MESSAGES);
    }

    #[test]
    fn lists_and_looks_up_names() {
        let perms = MemberPermissions::MANAGE_INVITES | MemberPermissions::SEND_MESSAGES;
        assert_eq!(perms.list(), vec!["SEND_MESSAGES", "MANAGE_INVITES"]);
        assert_eq!(
            MemberPermissions::from_name("MANAGE_TASKS"),
            Some(MemberPermissions::MANAGE_TASKS)
        );
        assert_eq!(MemberPermissions::from_name("ADMINISTRATOR"), None);
        assert_eq!(MemberPermissions::MODERATOR_DEFAULT.list().len(), 10);
    }

    #[test]
    fn role_ranks_and_wire_names() {
        assert!(MemberRole::Owner.rank() > MemberRole::Moderator.rank());
        assert!(MemberRole::Moderator.rank() > MemberRole::User.rank());
        assert_eq!(serde_json::to_string(&MemberRole::Moderator).unwrap(), "\"moderator\"");
        assert_eq!(MemberRole::parse("owner"), Some(MemberRole::Owner));
        assert_eq!(MemberRole::parse("admin"), None);
    }
}

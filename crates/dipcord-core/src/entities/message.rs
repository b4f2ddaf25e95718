//! Message entity plus its attachments and mentions

use chrono::{DateTime, Utc};

use crate::value_objects::Snowflake;

/// Message entity. Deleted messages keep their row; only the flag flips.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: Snowflake,
    pub channel_id: Snowflake,
    pub user_id: Snowflake,
    pub content: String,
    /// Root of the thread this message replies to
    pub parent_message_id: Option<Snowflake>,
    pub is_edited: bool,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Message {
    pub const MAX_CONTENT_LEN: usize = 4000;
    pub const MAX_ATTACHMENTS: usize = 10;

    pub fn new(id: Snowflake, channel_id: Snowflake, user_id: Snowflake, content: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            channel_id,
            user_id,
            content,
            parent_message_id: None,
            is_edited: false,
            is_deleted: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[must_use]
    pub fn replying_to(mut self, parent_id: Snowflake) -> Self {
        self.parent_message_id = Some(parent_id);
        self
    }

    #[inline]
    pub fn is_reply(&self) -> bool {
        self.parent_message_id.is_some()
    }

    /// Thread root: itself for top-level messages, the parent otherwise
    #[inline]
    pub fn thread_root(&self) -> Snowflake {
        self.parent_message_id.unwrap_or(self.id)
    }

    pub fn edit(&mut self, content: String) {
        self.content = content;
        self.is_edited = true;
        self.updated_at = Utc::now();
    }

    pub fn soft_delete(&mut self) {
        self.is_deleted = true;
        self.updated_at = Utc::now();
    }

    /// Content as shown to clients; deleted messages show nothing
    pub fn visible_content(&self) -> Option<&str> {
        (!self.is_deleted).then_some(self.content.as_str())
    }
}

/// File metadata attached to a message. The bytes live elsewhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageAttachment {
    pub id: Snowflake,
    pub message_id: Snowflake,
    pub filename: String,
    pub url: String,
    pub content_type: Option<String>,
    pub size_bytes: i64,
}

impl MessageAttachment {
    #[inline]
    pub fn is_image(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|ct| ct.starts_with("image/"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageMention {
    pub message_id: Snowflake,
    pub user_id: Snowflake,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message() -> Message {
        Message::new(
            Snowflake::new(10),
            Snowflake::new(1),
            Snowflake::new(2),
            "hello".to_string(),
        )
    }

    #[test]
    fn test_edit_sets_flag() {
        let mut msg = message();
        assert!(!msg.is_edited);
        msg.edit("hello there".to_string());
        assert!(msg.is_edited);
        assert_eq!(msg.content, "hello there");
    }

    #[test]
    fn test_soft_delete_hides_content() {
        let mut msg = message();
        assert_eq!(msg.visible_content(), Some("hello"));
        msg.soft_delete();
        assert!(msg.is_deleted);
        assert_eq!(msg.visible_content(), None);
        assert_eq!(msg.content, "hello");
    }

    #[test]
    fn test_thread_root() {
        let msg = message();
        assert!(!msg.is_reply());
        assert_eq!(msg.thread_root(), Snowflake::new(10));

        let reply = Message::new(
            Snowflake::new(11),
            Snowflake::new(1),
            Snowflake::new(3),
            "hi".to_string(),
        )
        .replying_to(Snowflake::new(10));
        assert!(reply.is_reply());
        assert_eq!(reply.thread_root(), Snowflake::new(10));
    }

    #[test]
    fn test_attachment_is_image() {
        let mut att = MessageAttachment {
            id: Snowflake::new(1),
            message_id: Snowflake::new(2),
            filename: "cat.png".to_string(),
            url: "https://cdn.example.com/cat.png".to_string(),
            content_type: Some("image/png".to_string()),
            size_bytes: 1024,
        };
        assert!(att.is_image());
        att.content_type = None;
        assert!(!att.is_image());
    }
}

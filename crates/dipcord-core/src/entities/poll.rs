//! Poll entity with its options and votes

use chrono::{DateTime, Utc};

use crate::value_objects::Snowflake;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Poll {
    pub id: Snowflake,
    pub channel_id: Snowflake,
    pub created_by: Snowflake,
    pub question: String,
    pub allow_multiple: bool,
    pub closes_at: Option<DateTime<Utc>>,
    pub is_closed: bool,
    pub created_at: DateTime<Utc>,
}

impl Poll {
    pub const MIN_OPTIONS: usize = 2;
    pub const MAX_OPTIONS: usize = 10;

    pub fn new(id: Snowflake, channel_id: Snowflake, created_by: Snowflake, question: String) -> Self {
        Self {
            id,
            channel_id,
            created_by,
            question,
            allow_multiple: false,
            closes_at: None,
            is_closed: false,
            created_at: Utc::now(),
        }
    }

    /// Not closed by hand and not past its deadline
    pub fn is_open(&self) -> bool {
        !self.is_closed && self.closes_at.map_or(true, |at| Utc::now() < at)
    }

    /// Whether a ballot with `selected` options is acceptable for this poll
    pub fn accepts_selection(&self, selected: usize) -> bool {
        selected > 0 && (self.allow_multiple || selected == 1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollOption {
    pub id: Snowflake,
    pub poll_id: Snowflake,
    pub text: String,
    pub position: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PollVote {
    pub poll_id: Snowflake,
    pub option_id: Snowflake,
    pub user_id: Snowflake,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn poll() -> Poll {
        Poll::new(
            Snowflake::new(1),
            Snowflake::new(2),
            Snowflake::new(3),
            "Lunch?".to_string(),
        )
    }

    #[test]
    fn test_open_until_closed() {
        let mut poll = poll();
        assert!(poll.is_open());
        poll.is_closed = true;
        assert!(!poll.is_open());
    }

    #[test]
    fn test_deadline() {
        let mut poll = poll();
        poll.closes_at = Some(Utc::now() + Duration::hours(1));
        assert!(poll.is_open());
        poll.closes_at = Some(Utc::now() - Duration::seconds(1));
        assert!(!poll.is_open());
    }

    #[test]
    fn test_selection_rules() {
        let mut poll = poll();
        assert!(!poll.accepts_selection(0));
        assert!(poll.accepts_selection(1));
        assert!(!poll.accepts_selection(2));

        poll.allow_multiple = true;
        assert!(poll.accepts_selection(3));
        assert!(!poll.accepts_selection(0));
    }
}

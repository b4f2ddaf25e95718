//! Entity to DTO mappers
//!
//! Implements `From` conversions from domain entities to response DTOs.
//! Messages and polls need data from several repositories, so they are
//! assembled from the helper structs below.

use std::collections::HashMap;

use dipcord_core::{
    Channel, ChannelInvite, ChannelMember, Message, MessageAttachment, Poll, PollOption,
    ReactionSummary, Snowflake, Task, User,
};

use super::responses::{
    AttachmentResponse, ChannelResponse, CurrentUserResponse, InviteResponse, MemberResponse,
    MessageResponse, PollOptionResponse, PollResponse, ReactionResponse, TaskResponse,
    UserResponse,
};

// ============================================================================
// User Mappers
// ============================================================================

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            surname: user.surname.clone(),
            display_name: user.display_name(),
            created_at: user.created_at,
        }
    }
}

impl From<&User> for CurrentUserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            surname: user.surname.clone(),
            email: user.email.clone(),
            roles: user.roles.clone(),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

// ============================================================================
// Channel Mappers
// ============================================================================

impl From<&Channel> for ChannelResponse {
    fn from(channel: &Channel) -> Self {
        Self {
            id: channel.id,
            name: channel.name.clone(),
            description: channel.description.clone(),
            max_participants: channel.max_participants,
            access_settings: channel.access,
            created_by: channel.created_by,
            member_count: None,
            created_at: channel.created_at,
            updated_at: channel.updated_at,
        }
    }
}

impl From<Channel> for ChannelResponse {
    fn from(channel: Channel) -> Self {
        Self::from(&channel)
    }
}

/// Member plus the user row, when it could be loaded
pub struct MemberWithUser {
    pub member: ChannelMember,
    pub user: Option<User>,
}

impl From<MemberWithUser> for MemberResponse {
    fn from(data: MemberWithUser) -> Self {
        Self {
            channel_id: data.member.channel_id,
            user_id: data.member.user_id,
            role: data.member.role,
            permissions: data.member.permissions,
            joined_at: data.member.joined_at,
            user: data.user.as_ref().map(UserResponse::from),
        }
    }
}

// ============================================================================
// Invite Mappers
// ============================================================================

impl From<&ChannelInvite> for InviteResponse {
    fn from(invite: &ChannelInvite) -> Self {
        Self {
            code: invite.code.clone(),
            channel_id: invite.channel_id,
            created_by_user_id: invite.created_by_user_id,
            expires_at: invite.expires_at,
            is_used: invite.is_used,
            used_by_user_id: invite.used_by_user_id,
            used_at: invite.used_at,
            created_at: invite.created_at,
        }
    }
}

// ============================================================================
// Message Mappers
// ============================================================================

impl From<&MessageAttachment> for AttachmentResponse {
    fn from(attachment: &MessageAttachment) -> Self {
        Self {
            id: attachment.id,
            filename: attachment.filename.clone(),
            url: attachment.url.clone(),
            content_type: attachment.content_type.clone(),
            size_bytes: attachment.size_bytes,
        }
    }
}

impl From<ReactionSummary> for ReactionResponse {
    fn from(summary: ReactionSummary) -> Self {
        Self {
            emoji: summary.emoji,
            count: summary.count,
            me: summary.me,
        }
    }
}

/// A message and everything rendered alongside it
pub struct MessageWithDetails {
    pub message: Message,
    pub author: Option<User>,
    pub attachments: Vec<MessageAttachment>,
    pub mentions: Vec<Snowflake>,
    pub reactions: Vec<ReactionSummary>,
    pub reply_count: i64,
}

impl From<MessageWithDetails> for MessageResponse {
    fn from(data: MessageWithDetails) -> Self {
        let MessageWithDetails {
            message,
            author,
            attachments,
            mentions,
            reactions,
            reply_count,
        } = data;

        // Deleted messages keep their place in the timeline but show nothing
        let deleted = message.is_deleted;
        Self {
            id: message.id,
            channel_id: message.channel_id,
            user_id: message.user_id,
            author: author.as_ref().map(UserResponse::from),
            content: message.visible_content().map(str::to_string),
            parent_message_id: message.parent_message_id,
            is_edited: message.is_edited,
            is_deleted: deleted,
            attachments: if deleted {
                Vec::new()
            } else {
                attachments.iter().map(AttachmentResponse::from).collect()
            },
            mentions: if deleted { Vec::new() } else { mentions },
            reactions: reactions.into_iter().map(ReactionResponse::from).collect(),
            reply_count,
            created_at: message.created_at,
            updated_at: message.updated_at,
        }
    }
}

// ============================================================================
// Task Mappers
// ============================================================================

impl From<&Task> for TaskResponse {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id,
            channel_id: task.channel_id,
            title: task.title.clone(),
            description: task.description.clone(),
            status: task.status,
            assignee_id: task.assignee_id,
            created_by: task.created_by,
            due_date: task.due_date,
            position: task.position,
            is_overdue: task.is_overdue(),
            created_at: task.created_at,
            updated_at: task.updated_at,
        }
    }
}

// ============================================================================
// Poll Mappers
// ============================================================================

/// A poll with its tallies, seen by one user
pub struct PollWithResults {
    pub poll: Poll,
    pub options: Vec<PollOption>,
    /// Votes per option id
    pub vote_counts: HashMap<Snowflake, i64>,
    pub my_votes: Vec<Snowflake>,
    pub total_voters: i64,
}

impl From<PollWithResults> for PollResponse {
    fn from(data: PollWithResults) -> Self {
        let options = data
            .options
            .into_iter()
            .map(|option| PollOptionResponse {
                votes: data.vote_counts.get(&option.id).copied().unwrap_or(0),
                id: option.id,
                text: option.text,
                position: option.position,
            })
            .collect();

        Self {
            id: data.poll.id,
            channel_id: data.poll.channel_id,
            created_by: data.poll.created_by,
            is_open: data.poll.is_open(),
            question: data.poll.question,
            allow_multiple: data.poll.allow_multiple,
            closes_at: data.poll.closes_at,
            is_closed: data.poll.is_closed,
            options,
            my_votes: data.my_votes,
            total_voters: data.total_voters,
            created_at: data.poll.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deleted_message_hides_content() {
        let mut message = Message::new(
            Snowflake::new(10),
            Snowflake::new(1),
            Snowflake::new(2),
            "secret".to_string(),
        );
        message.soft_delete();

        let response = MessageResponse::from(MessageWithDetails {
            message,
            author: None,
            attachments: vec![],
            mentions: vec![Snowflake::new(3)],
            reactions: vec![],
            reply_count: 2,
        });

        assert!(response.is_deleted);
        assert!(response.content.is_none());
        assert!(response.mentions.is_empty());
        assert_eq!(response.reply_count, 2);

        let json = serde_json::to_value(&response).unwrap();
        assert!(json["content"].is_null());
    }

    #[test]
    fn test_poll_results_fill_missing_counts() {
        let poll = Poll::new(
            Snowflake::new(1),
            Snowflake::new(2),
            Snowflake::new(3),
            "Lunch?".to_string(),
        );
        let options = vec![
            PollOption {
                id: Snowflake::new(11),
                poll_id: poll.id,
                text: "Pizza".to_string(),
                position: 0,
            },
            PollOption {
                id: Snowflake::new(12),
                poll_id: poll.id,
                text: "Sushi".to_string(),
                position: 1,
            },
        ];

        let response = PollResponse::from(PollWithResults {
            poll,
            options,
            vote_counts: HashMap::from([(Snowflake::new(11), 4)]),
            my_votes: vec![Snowflake::new(11)],
            total_voters: 4,
        });

        assert!(response.is_open);
        assert_eq!(response.options[0].votes, 4);
        assert_eq!(response.options[1].votes, 0);
    }
}

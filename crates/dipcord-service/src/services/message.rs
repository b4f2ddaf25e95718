//! Message service
//!
//! Handles message creation, editing, deletion, threads, reactions and
//! typing notifications.

use std::collections::{HashMap, HashSet};

use dipcord_core::{
    CursorQuery, DomainError, MemberPermissions, Message, MessageAttachment, MessageReaction,
    NewMessage, ReactionAction, RealtimeEvent, Snowflake, User,
};
use tracing::{debug, info, instrument};
use validator::Validate;

use crate::dto::{
    CreateMessageRequest, MessageResponse, MessageWithDetails, ReactionResponse,
    ReactionToggleResponse, ToggleReactionRequest, UpdateMessageRequest,
};

use super::context::ServiceContext;
use super::error::ServiceResult;
use super::permission::{require_flag, ChannelAccess, PermissionService};

/// Message service
pub struct MessageService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> MessageService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Top-level messages, newest page first
    #[instrument(skip(self))]
    pub async fn list_messages(
        &self,
        channel_id: Snowflake,
        user_id: Snowflake,
        query: CursorQuery,
    ) -> ServiceResult<Vec<MessageResponse>> {
        PermissionService::new(self.ctx)
            .require_member(channel_id, user_id)
            .await?;

        let messages = self
            .ctx
            .message_repo()
            .find_by_channel(channel_id, query)
            .await?;
        self.hydrate(messages, user_id).await
    }

    /// Replies of a thread, oldest first
    #[instrument(skip(self))]
    pub async fn list_replies(
        &self,
        parent_id: Snowflake,
        user_id: Snowflake,
        query: CursorQuery,
    ) -> ServiceResult<Vec<MessageResponse>> {
        let parent = self.find_message(parent_id).await?;
        PermissionService::new(self.ctx)
            .require_member(parent.channel_id, user_id)
            .await?;

        let replies = self
            .ctx
            .message_repo()
            .find_replies(parent.thread_root(), query)
            .await?;
        self.hydrate(replies, user_id).await
    }

    #[instrument(skip(self))]
    pub async fn get_message(
        &self,
        message_id: Snowflake,
        user_id: Snowflake,
    ) -> ServiceResult<MessageResponse> {
        let message = self.find_message(message_id).await?;
        PermissionService::new(self.ctx)
            .require_member(message.channel_id, user_id)
            .await?;

        self.hydrate_one(message, user_id).await
    }

    /// Post a message or a reply
    #[instrument(skip(self, request))]
    pub async fn create_message(
        &self,
        channel_id: Snowflake,
        user_id: Snowflake,
        request: CreateMessageRequest,
    ) -> ServiceResult<MessageResponse> {
        let access = PermissionService::new(self.ctx)
            .require_member(channel_id, user_id)
            .await?;
        access.require_can_post()?;

        if !request.attachments.is_empty() {
            access.require(MemberPermissions::ATTACH_FILES)?;
        }
        check_content(&request.content, request.attachments.len())?;
        request.validate()?;

        let parent_id = match request.parent_message_id {
            Some(parent_id) => Some(self.thread_parent(channel_id, parent_id).await?),
            None => None,
        };

        let message_id = self.ctx.generate_id();
        let mut message = Message::new(message_id, channel_id, user_id, request.content);
        if let Some(parent_id) = parent_id {
            message = message.replying_to(parent_id);
        }

        let attachments: Vec<MessageAttachment> = request
            .attachments
            .into_iter()
            .map(|a| MessageAttachment {
                id: self.ctx.generate_id(),
                message_id,
                filename: a.filename,
                url: a.url,
                content_type: a.content_type,
                size_bytes: a.size_bytes,
            })
            .collect();

        let mentions = self.member_mentions(&access, &request.mentions).await?;

        let new = NewMessage {
            message,
            attachments,
            mentions,
        };
        self.ctx.message_repo().create(&new).await?;

        info!(
            message_id = %message_id,
            channel_id = %channel_id,
            mentions = new.mentions.len(),
            "Message created"
        );

        self.ctx
            .publish(RealtimeEvent::MessageCreated {
                channel_id,
                message_id,
                parent_message_id: parent_id,
            })
            .await;

        for mentioned in &new.mentions {
            self.ctx
                .publish(RealtimeEvent::MentionCreated {
                    user_id: *mentioned,
                    channel_id,
                    message_id,
                    author_id: user_id,
                })
                .await;
        }

        let NewMessage {
            message,
            attachments,
            mentions,
        } = new;
        let author = self.ctx.user_repo().find_by_id(user_id).await?;

        Ok(MessageResponse::from(MessageWithDetails {
            message,
            author,
            attachments,
            mentions,
            reactions: Vec::new(),
            reply_count: 0,
        }))
    }

    /// Author only
    #[instrument(skip(self, request))]
    pub async fn edit_message(
        &self,
        message_id: Snowflake,
        user_id: Snowflake,
        request: UpdateMessageRequest,
    ) -> ServiceResult<MessageResponse> {
        let mut message = self.find_message(message_id).await?;
        PermissionService::new(self.ctx)
            .require_member(message.channel_id, user_id)
            .await?;

        if message.user_id != user_id {
            return Err(DomainError::NotMessageAuthor.into());
        }
        if message.is_deleted {
            return Err(DomainError::MessageDeleted.into());
        }
        check_content(&request.content, 0)?;
        request.validate()?;

        message.edit(request.content);
        self.ctx.message_repo().update(&message).await?;

        info!(message_id = %message_id, "Message edited");

        self.ctx
            .publish(RealtimeEvent::MessageUpdated {
                channel_id: message.channel_id,
                message_id,
            })
            .await;

        self.hydrate_one(message, user_id).await
    }

    /// The author, or anyone holding `MANAGE_MESSAGES`. Deleting twice is a no-op.
    #[instrument(skip(self))]
    pub async fn delete_message(&self, message_id: Snowflake, user_id: Snowflake) -> ServiceResult<()> {
        let message = self.find_message(message_id).await?;
        let access = PermissionService::new(self.ctx)
            .require_member(message.channel_id, user_id)
            .await?;

        if message.user_id != user_id {
            access.require(MemberPermissions::MANAGE_MESSAGES)?;
        }

        if message.is_deleted {
            debug!(message_id = %message_id, "Message already deleted");
            return Ok(());
        }

        self.ctx.message_repo().soft_delete(message_id).await?;

        info!(message_id = %message_id, deleted_by = %user_id, "Message deleted");

        self.ctx
            .publish(RealtimeEvent::MessageDeleted {
                channel_id: message.channel_id,
                message_id,
            })
            .await;

        Ok(())
    }

    /// Add the reaction if the user has not placed it yet, remove it otherwise
    #[instrument(skip(self, request), fields(emoji = %request.emoji))]
    pub async fn toggle_reaction(
        &self,
        message_id: Snowflake,
        user_id: Snowflake,
        request: ToggleReactionRequest,
    ) -> ServiceResult<ReactionToggleResponse> {
        let message = self.find_message(message_id).await?;
        let access = PermissionService::new(self.ctx)
            .require_member(message.channel_id, user_id)
            .await?;
        require_flag(&access.member, MemberPermissions::ADD_REACTIONS)?;

        let emoji = request.emoji;
        if !MessageReaction::is_valid_emoji(&emoji) {
            return Err(DomainError::InvalidEmoji.into());
        }
        if message.is_deleted {
            return Err(DomainError::MessageDeleted.into());
        }

        let reactions = self.ctx.reaction_repo();
        let action = if reactions.find(message_id, user_id, &emoji).await?.is_some() {
            reactions.delete(message_id, user_id, &emoji).await?;
            ReactionAction::Remove
        } else {
            reactions
                .create(&MessageReaction::new(message_id, user_id, emoji.clone()))
                .await?;
            ReactionAction::Add
        };

        let count = reactions
            .summarize(&[message_id], user_id)
            .await?
            .remove(&message_id)
            .unwrap_or_default()
            .into_iter()
            .find(|summary| summary.emoji == emoji)
            .map_or(0, |summary| summary.count);

        debug!(
            message_id = %message_id,
            user_id = %user_id,
            action = action.as_str(),
            count,
            "Reaction toggled"
        );

        self.ctx
            .publish(RealtimeEvent::ReactionUpdated {
                channel_id: message.channel_id,
                message_id,
                user_id,
                emoji: emoji.clone(),
                action,
            })
            .await;

        Ok(ReactionToggleResponse {
            action,
            emoji,
            count,
        })
    }

    /// Per-emoji counts for a message
    #[instrument(skip(self))]
    pub async fn list_reactions(
        &self,
        message_id: Snowflake,
        user_id: Snowflake,
    ) -> ServiceResult<Vec<ReactionResponse>> {
        let message = self.find_message(message_id).await?;
        PermissionService::new(self.ctx)
            .require_member(message.channel_id, user_id)
            .await?;

        let summaries = self
            .ctx
            .reaction_repo()
            .summarize(&[message_id], user_id)
            .await?
            .remove(&message_id)
            .unwrap_or_default();

        Ok(summaries.into_iter().map(ReactionResponse::from).collect())
    }

    #[instrument(skip(self))]
    pub async fn start_typing(&self, channel_id: Snowflake, user_id: Snowflake) -> ServiceResult<()> {
        PermissionService::new(self.ctx)
            .require_member(channel_id, user_id)
            .await?;

        self.ctx
            .publish(RealtimeEvent::TypingStart {
                channel_id,
                user_id,
            })
            .await;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn stop_typing(&self, channel_id: Snowflake, user_id: Snowflake) -> ServiceResult<()> {
        PermissionService::new(self.ctx)
            .require_member(channel_id, user_id)
            .await?;

        self.ctx
            .publish(RealtimeEvent::TypingStop {
                channel_id,
                user_id,
            })
            .await;
        Ok(())
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    async fn find_message(&self, message_id: Snowflake) -> ServiceResult<Message> {
        Ok(self
            .ctx
            .message_repo()
            .find_by_id(message_id)
            .await?
            .ok_or(DomainError::MessageNotFound(message_id))?)
    }

    /// Resolve the parent of a new reply to its thread root
    async fn thread_parent(&self, channel_id: Snowflake, parent_id: Snowflake) -> ServiceResult<Snowflake> {
        let parent = self.find_message(parent_id).await?;
        if parent.channel_id != channel_id {
            return Err(DomainError::InvalidParentMessage.into());
        }
        if parent.is_deleted {
            return Err(DomainError::MessageDeleted.into());
        }
        if let Some(root_id) = parent.parent_message_id {
            let root = self.find_message(root_id).await?;
            if root.is_deleted {
                return Err(DomainError::MessageDeleted.into());
            }
        }
        Ok(parent.thread_root())
    }

    /// Mentioned ids that belong to the channel, deduplicated in order
    ///
    /// The author never mentions themself.
    async fn member_mentions(
        &self,
        access: &ChannelAccess,
        requested: &[Snowflake],
    ) -> ServiceResult<Vec<Snowflake>> {
        let author_id = access.member.user_id;
        let mut seen = HashSet::new();
        let mut mentions = Vec::new();

        for user_id in requested.iter().copied() {
            if user_id == author_id || !seen.insert(user_id) {
                continue;
            }
            let is_member = self
                .ctx
                .member_repo()
                .find(access.channel.id, user_id)
                .await?
                .is_some();
            if is_member {
                mentions.push(user_id);
            } else {
                debug!(user_id = %user_id, "Dropping mention of non-member");
            }
        }

        Ok(mentions)
    }

    async fn hydrate_one(&self, message: Message, viewer: Snowflake) -> ServiceResult<MessageResponse> {
        let id = message.id;
        self.hydrate(vec![message], viewer)
            .await?
            .pop()
            .ok_or_else(|| DomainError::MessageNotFound(id).into())
    }

    /// Batch-load authors, attachments, mentions, reactions and reply counts
    async fn hydrate(
        &self,
        messages: Vec<Message>,
        viewer: Snowflake,
    ) -> ServiceResult<Vec<MessageResponse>> {
        if messages.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Snowflake> = messages.iter().map(|m| m.id).collect();
        let mut author_ids: Vec<Snowflake> = messages.iter().map(|m| m.user_id).collect();
        author_ids.sort_unstable();
        author_ids.dedup();

        let authors: HashMap<Snowflake, User> = self
            .ctx
            .user_repo()
            .find_many(&author_ids)
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect();

        let mut attachments: HashMap<Snowflake, Vec<MessageAttachment>> = HashMap::new();
        for attachment in self.ctx.message_repo().find_attachments(&ids).await? {
            attachments
                .entry(attachment.message_id)
                .or_default()
                .push(attachment);
        }

        let mut mentions: HashMap<Snowflake, Vec<Snowflake>> = HashMap::new();
        for mention in self.ctx.message_repo().find_mentions(&ids).await? {
            mentions
                .entry(mention.message_id)
                .or_default()
                .push(mention.user_id);
        }

        let mut reactions = self.ctx.reaction_repo().summarize(&ids, viewer).await?;
        let reply_counts = self.ctx.message_repo().reply_counts(&ids).await?;

        Ok(messages
            .into_iter()
            .map(|message| {
                let id = message.id;
                MessageResponse::from(MessageWithDetails {
                    author: authors.get(&message.user_id).cloned(),
                    attachments: attachments.remove(&id).unwrap_or_default(),
                    mentions: mentions.remove(&id).unwrap_or_default(),
                    reactions: reactions.remove(&id).unwrap_or_default(),
                    reply_count: reply_counts.get(&id).copied().unwrap_or(0),
                    message,
                })
            })
            .collect())
    }
}

/// Length and emptiness rules shared by create and edit
fn check_content(content: &str, attachment_count: usize) -> ServiceResult<()> {
    if content.chars().count() > Message::MAX_CONTENT_LEN {
        return Err(DomainError::ContentTooLong {
            max: Message::MAX_CONTENT_LEN,
        }
        .into());
    }
    if attachment_count > Message::MAX_ATTACHMENTS {
        return Err(DomainError::TooManyAttachments {
            max: Message::MAX_ATTACHMENTS,
        }
        .into());
    }
    if content.trim().is_empty() && attachment_count == 0 {
        return Err(DomainError::EmptyMessage.into());
    }
    Ok(())
}

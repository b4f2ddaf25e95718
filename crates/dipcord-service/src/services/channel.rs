//! Channel service
//!
//! Handles channel creation, discovery, updates, deletion and joining public
//! channels. Membership management lives in [`super::member`], invites in
//! [`super::invite`].

use dipcord_core::{
    Channel, ChannelMember, CursorQuery, DomainError, MemberPermissions, MemberRole,
    RealtimeEvent, Snowflake,
};
use tracing::{info, instrument};
use validator::Validate;

use crate::dto::{
    ChannelResponse, CreateChannelRequest, MemberResponse, MemberWithUser, UpdateChannelRequest,
};

use super::context::ServiceContext;
use super::error::ServiceResult;
use super::permission::PermissionService;

/// Channel service
pub struct ChannelService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ChannelService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Create a channel owned by `user_id`
    #[instrument(skip(self, request))]
    pub async fn create_channel(
        &self,
        user_id: Snowflake,
        request: CreateChannelRequest,
    ) -> ServiceResult<ChannelResponse> {
        request.validate()?;

        let max_participants = request
            .max_participants
            .unwrap_or(Channel::DEFAULT_PARTICIPANTS);
        check_capacity(max_participants)?;

        let name = request.name.trim().to_string();
        if name.is_empty() {
            return Err(DomainError::ValidationError("Channel name cannot be blank".into()).into());
        }

        let channel = Channel::new(self.ctx.generate_id(), name, user_id)
            .with_description(request.description)
            .with_max_participants(max_participants)
            .with_access(request.access_settings.unwrap_or_default());
        let owner = ChannelMember::new(channel.id, user_id, MemberRole::Owner);

        self.ctx
            .channel_repo()
            .create_with_owner(&channel, &owner)
            .await?;

        info!(channel_id = %channel.id, owner_id = %user_id, "Channel created");

        // The creator's connections start listening right away
        self.ctx
            .publish(RealtimeEvent::ChannelJoined {
                user_id,
                channel_id: channel.id,
            })
            .await;

        Ok(ChannelResponse::from(&channel).with_member_count(1))
    }

    /// Channels the user belongs to
    #[instrument(skip(self))]
    pub async fn list_my_channels(&self, user_id: Snowflake) -> ServiceResult<Vec<ChannelResponse>> {
        let channels = self.ctx.channel_repo().find_by_member(user_id).await?;
        Ok(channels.iter().map(ChannelResponse::from).collect())
    }

    /// Public channels with their member counts, newest first
    #[instrument(skip(self))]
    pub async fn discover_channels(&self, query: CursorQuery) -> ServiceResult<Vec<ChannelResponse>> {
        let channels = self.ctx.channel_repo().find_public(query).await?;
        Ok(channels
            .iter()
            .map(|(channel, count)| ChannelResponse::from(channel).with_member_count(*count))
            .collect())
    }

    /// Public channels are visible to everyone, private ones to members only
    #[instrument(skip(self))]
    pub async fn get_channel(
        &self,
        channel_id: Snowflake,
        user_id: Snowflake,
    ) -> ServiceResult<ChannelResponse> {
        let permissions = PermissionService::new(self.ctx);
        let channel = permissions.channel(channel_id).await?;

        if !channel.is_public() && !permissions.is_member(channel_id, user_id).await? {
            return Err(DomainError::NotChannelMember.into());
        }

        let count = self.ctx.member_repo().count(channel_id).await?;
        Ok(ChannelResponse::from(&channel).with_member_count(count))
    }

    /// Requires `MANAGE_CHANNEL`
    #[instrument(skip(self, request))]
    pub async fn update_channel(
        &self,
        channel_id: Snowflake,
        user_id: Snowflake,
        request: UpdateChannelRequest,
    ) -> ServiceResult<ChannelResponse> {
        request.validate()?;

        let access = PermissionService::new(self.ctx)
            .require_permission(channel_id, user_id, MemberPermissions::MANAGE_CHANNEL)
            .await?;
        let mut channel = access.channel;
        let count = self.ctx.member_repo().count(channel_id).await?;

        if let Some(max) = request.max_participants {
            check_capacity(max)?;
            if i64::from(max) < count {
                return Err(DomainError::CapacityBelowMemberCount { current: count }.into());
            }
            channel.max_participants = max;
        }

        if let Some(name) = request.name {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(
                    DomainError::ValidationError("Channel name cannot be blank".into()).into(),
                );
            }
            channel.name = name;
        }

        if let Some(description) = request.description {
            channel.description = description;
        }

        if let Some(settings) = request.access_settings {
            channel.access = settings;
        }

        channel.touch();
        self.ctx.channel_repo().update(&channel).await?;

        info!(channel_id = %channel_id, "Channel updated");

        self.ctx
            .publish(RealtimeEvent::ChannelUpdated { channel_id })
            .await;

        Ok(ChannelResponse::from(&channel).with_member_count(count))
    }

    /// Owner only. Removes the channel and everything in it.
    #[instrument(skip(self))]
    pub async fn delete_channel(&self, channel_id: Snowflake, user_id: Snowflake) -> ServiceResult<()> {
        let access = PermissionService::new(self.ctx)
            .require_member(channel_id, user_id)
            .await?;
        access.require_owner()?;

        let removed = self.ctx.channel_repo().delete_cascade(channel_id).await?;

        info!(
            channel_id = %channel_id,
            messages = removed.messages,
            members = removed.members,
            "Channel deleted"
        );

        self.ctx
            .publish(RealtimeEvent::ChannelDeleted { channel_id })
            .await;

        Ok(())
    }

    /// Join a public channel as a plain user
    #[instrument(skip(self))]
    pub async fn join_channel(
        &self,
        channel_id: Snowflake,
        user_id: Snowflake,
    ) -> ServiceResult<MemberResponse> {
        let permissions = PermissionService::new(self.ctx);
        let channel = permissions.channel(channel_id).await?;

        if !channel.is_public() {
            return Err(DomainError::PrivateChannel.into());
        }
        if permissions.is_member(channel_id, user_id).await? {
            return Err(DomainError::AlreadyMember.into());
        }

        let member = ChannelMember::new(channel_id, user_id, MemberRole::User);
        let inserted = self
            .ctx
            .member_repo()
            .create_within_capacity(&member, channel.max_participants)
            .await?;
        if !inserted {
            return Err(DomainError::ChannelFull.into());
        }

        info!(channel_id = %channel_id, user_id = %user_id, "User joined channel");

        publish_member_added(self.ctx, channel_id, user_id).await;

        let user = self.ctx.user_repo().find_by_id(user_id).await?;
        Ok(MemberResponse::from(MemberWithUser { member, user }))
    }
}

pub(crate) fn check_capacity(max: i32) -> ServiceResult<()> {
    if Channel::is_valid_capacity(max) {
        Ok(())
    } else {
        Err(DomainError::InvalidCapacity {
            min: Channel::MIN_PARTICIPANTS,
            max: Channel::MAX_PARTICIPANTS,
        }
        .into())
    }
}

/// `member:added` for the channel plus `channel:joined` for the new member
pub(crate) async fn publish_member_added(
    ctx: &ServiceContext,
    channel_id: Snowflake,
    user_id: Snowflake,
) {
    ctx.publish(RealtimeEvent::MemberAdded {
        channel_id,
        user_id,
    })
    .await;
    ctx.publish(RealtimeEvent::ChannelJoined {
        user_id,
        channel_id,
    })
    .await;
}

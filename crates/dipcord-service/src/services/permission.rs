//! Permission service
//!
//! Resolves a requester's membership in a channel and checks it against the
//! permission flags and role rules every other service builds on.

use dipcord_core::{Channel, ChannelMember, DomainError, MemberPermissions, Snowflake};
use tracing::{debug, instrument};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// A channel together with the requester's membership in it
#[derive(Debug, Clone)]
pub struct ChannelAccess {
    pub channel: Channel,
    pub member: ChannelMember,
}

impl ChannelAccess {
    /// Fail with `MissingPermission` unless the member holds `permission`
    pub fn require(&self, permission: MemberPermissions) -> ServiceResult<()> {
        require_flag(&self.member, permission)
    }

    pub fn require_owner(&self) -> ServiceResult<()> {
        if self.member.is_owner() {
            Ok(())
        } else {
            Err(DomainError::NotChannelOwner.into())
        }
    }

    /// Posting rules: `SEND_MESSAGES`, and privileged status in read-only channels
    pub fn require_can_post(&self) -> ServiceResult<()> {
        self.require(MemberPermissions::SEND_MESSAGES)?;
        if self.channel.access.read_only && !self.member.is_privileged() {
            return Err(DomainError::ReadOnlyChannel.into());
        }
        Ok(())
    }
}

/// Permission check against a single member
pub fn require_flag(member: &ChannelMember, permission: MemberPermissions) -> ServiceResult<()> {
    if member.can(permission) {
        Ok(())
    } else {
        Err(missing_permission(permission))
    }
}

/// 403 naming the flags that were missing
pub fn missing_permission(permission: MemberPermissions) -> ServiceError {
    DomainError::MissingPermission(permission.list().join(", ")).into()
}

/// Permission service for access control
pub struct PermissionService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> PermissionService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    #[instrument(skip(self))]
    pub async fn channel(&self, channel_id: Snowflake) -> ServiceResult<Channel> {
        self.ctx
            .channel_repo()
            .find_by_id(channel_id)
            .await?
            .ok_or_else(|| DomainError::ChannelNotFound(channel_id).into())
    }

    /// Membership row, if any
    #[instrument(skip(self))]
    pub async fn membership(
        &self,
        channel_id: Snowflake,
        user_id: Snowflake,
    ) -> ServiceResult<Option<ChannelMember>> {
        self.ctx
            .member_repo()
            .find(channel_id, user_id)
            .await
            .map_err(ServiceError::from)
    }

    /// Channel and membership, failing with 404 for a missing channel and
    /// 403 for a non-member
    #[instrument(skip(self))]
    pub async fn require_member(
        &self,
        channel_id: Snowflake,
        user_id: Snowflake,
    ) -> ServiceResult<ChannelAccess> {
        let channel = self.channel(channel_id).await?;
        let member = self
            .membership(channel_id, user_id)
            .await?
            .ok_or(DomainError::NotChannelMember)?;

        debug!(
            channel_id = %channel_id,
            user_id = %user_id,
            role = %member.role,
            "Resolved channel membership"
        );

        Ok(ChannelAccess { channel, member })
    }

    /// Membership plus a single permission flag
    #[instrument(skip(self))]
    pub async fn require_permission(
        &self,
        channel_id: Snowflake,
        user_id: Snowflake,
        permission: MemberPermissions,
    ) -> ServiceResult<ChannelAccess> {
        let access = self.require_member(channel_id, user_id).await?;
        access.require(permission)?;
        Ok(access)
    }

    #[instrument(skip(self))]
    pub async fn is_member(&self, channel_id: Snowflake, user_id: Snowflake) -> ServiceResult<bool> {
        Ok(self.membership(channel_id, user_id).await?.is_some())
    }
}

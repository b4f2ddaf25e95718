//! Invite service
//!
//! Single-use invite codes: create, preview, accept, list and revoke.

use dipcord_core::{
    generate_invite_code, ChannelInvite, ChannelMember, DomainError, InviteRedemption,
    MemberPermissions, MemberRole, RealtimeEvent, Snowflake,
};
use tracing::{info, instrument, warn};
use validator::Validate;

use crate::dto::{
    ChannelResponse, CreateInviteRequest, InviteChannelResponse, InvitePreviewResponse,
    InviteResponse,
};

use super::channel::publish_member_added;
use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::permission::{missing_permission, PermissionService};

/// Attempts at finding an unused code before giving up
const CODE_ATTEMPTS: usize = 3;

/// Invite service
pub struct InviteService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> InviteService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Owner, moderator, `MANAGE_INVITES`, or anyone when the channel allows member invites
    #[instrument(skip(self, request))]
    pub async fn create_invite(
        &self,
        channel_id: Snowflake,
        user_id: Snowflake,
        request: CreateInviteRequest,
    ) -> ServiceResult<InviteResponse> {
        request.validate()?;

        let access = PermissionService::new(self.ctx)
            .require_member(channel_id, user_id)
            .await?;
        if !access.member.can_manage_invites() && !access.channel.access.allow_member_invites {
            return Err(missing_permission(MemberPermissions::MANAGE_INVITES));
        }

        let expires_in = request.expires_in_seconds.unwrap_or(0);

        for attempt in 1..=CODE_ATTEMPTS {
            let invite = ChannelInvite::new(
                self.ctx.generate_id(),
                generate_invite_code(),
                channel_id,
                user_id,
            )
            .expiring_in(expires_in);

            match self.ctx.invite_repo().create(&invite).await {
                Ok(()) => {
                    info!(channel_id = %channel_id, code = %invite.code, "Invite created");

                    self.ctx
                        .publish(RealtimeEvent::InviteCreated {
                            channel_id,
                            code: invite.code.clone(),
                        })
                        .await;

                    return Ok(InviteResponse::from(&invite));
                }
                Err(DomainError::InviteCodeExists) => {
                    warn!(attempt, "Invite code collision, regenerating");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(ServiceError::internal("Could not generate a unique invite code"))
    }

    /// Invites of a channel, used ones included
    #[instrument(skip(self))]
    pub async fn list_invites(
        &self,
        channel_id: Snowflake,
        user_id: Snowflake,
    ) -> ServiceResult<Vec<InviteResponse>> {
        let access = PermissionService::new(self.ctx)
            .require_member(channel_id, user_id)
            .await?;
        if !access.member.can_manage_invites() {
            return Err(missing_permission(MemberPermissions::MANAGE_INVITES));
        }

        let invites = self.ctx.invite_repo().find_by_channel(channel_id).await?;
        Ok(invites.iter().map(InviteResponse::from).collect())
    }

    /// Preview for anyone holding the code
    #[instrument(skip(self))]
    pub async fn get_invite(&self, code: &str) -> ServiceResult<InvitePreviewResponse> {
        let invite = self.find_invite(code).await?;
        let channel = PermissionService::new(self.ctx)
            .channel(invite.channel_id)
            .await?;
        let member_count = self.ctx.member_repo().count(channel.id).await?;

        Ok(InvitePreviewResponse {
            usable: invite.is_usable() && channel.has_capacity(member_count),
            code: invite.code,
            expires_at: invite.expires_at,
            channel: InviteChannelResponse {
                id: channel.id,
                name: channel.name,
                description: channel.description,
                member_count,
                max_participants: channel.max_participants,
            },
        })
    }

    /// Redeem an invite and join its channel
    #[instrument(skip(self))]
    pub async fn accept_invite(&self, code: &str, user_id: Snowflake) -> ServiceResult<ChannelResponse> {
        let invite = self.find_invite(code).await?;
        if invite.is_used {
            return Err(DomainError::InviteUsed.into());
        }
        if invite.is_expired() {
            return Err(DomainError::InviteExpired.into());
        }

        let permissions = PermissionService::new(self.ctx);
        let channel = permissions.channel(invite.channel_id).await?;

        let count = self.ctx.member_repo().count(channel.id).await?;
        if !channel.has_capacity(count) {
            return Err(DomainError::ChannelFull.into());
        }
        if permissions.is_member(channel.id, user_id).await? {
            return Err(DomainError::AlreadyMember.into());
        }

        let member = ChannelMember::new(channel.id, user_id, MemberRole::User);
        match self
            .ctx
            .invite_repo()
            .redeem(&invite.code, &member, channel.max_participants)
            .await?
        {
            InviteRedemption::Joined => {}
            InviteRedemption::ChannelFull => return Err(DomainError::ChannelFull.into()),
            InviteRedemption::AlreadyUsed => {
                warn!(code = %invite.code, "Lost race for single-use invite");
                return Err(DomainError::InviteUsed.into());
            }
        }

        info!(
            channel_id = %channel.id,
            user_id = %user_id,
            code = %invite.code,
            "Invite accepted"
        );

        publish_member_added(self.ctx, channel.id, user_id).await;

        Ok(ChannelResponse::from(&channel).with_member_count(count + 1))
    }

    /// The creator, or owner / moderator / `MANAGE_INVITES`
    #[instrument(skip(self))]
    pub async fn revoke_invite(&self, code: &str, user_id: Snowflake) -> ServiceResult<()> {
        let invite = self.find_invite(code).await?;
        let access = PermissionService::new(self.ctx)
            .require_member(invite.channel_id, user_id)
            .await?;

        if invite.created_by_user_id != user_id && !access.member.can_manage_invites() {
            return Err(missing_permission(MemberPermissions::MANAGE_INVITES));
        }

        if !self.ctx.invite_repo().delete(&invite.code).await? {
            return Err(DomainError::InviteNotFound(invite.code).into());
        }

        info!(channel_id = %invite.channel_id, code = %invite.code, "Invite revoked");

        self.ctx
            .publish(RealtimeEvent::InviteRevoked {
                channel_id: invite.channel_id,
                code: invite.code,
            })
            .await;

        Ok(())
    }

    async fn find_invite(&self, code: &str) -> ServiceResult<ChannelInvite> {
        Ok(self
            .ctx
            .invite_repo()
            .find_by_code(code)
            .await?
            .ok_or_else(|| DomainError::InviteNotFound(code.to_string()))?)
    }
}

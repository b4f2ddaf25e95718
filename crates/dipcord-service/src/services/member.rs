//! Member service
//!
//! Adding, updating, removing members and handing over ownership.
//!
//! Role rules:
//! - exactly one owner per channel; the owner role only moves by transfer
//! - only the owner grants or revokes the moderator role
//! - nobody but the owner touches a moderator
//! - the owner can be neither removed nor edited by anyone else

use std::collections::HashMap;

use dipcord_core::{
    ChannelMember, DomainError, MemberPermissions, MemberRole, RealtimeEvent, Snowflake, User,
};
use tracing::{info, instrument};

use crate::dto::{
    AddMemberRequest, MemberResponse, MemberWithUser, TransferOwnershipRequest,
    UpdateMemberRequest,
};

use super::channel::publish_member_added;
use super::context::ServiceContext;
use super::error::ServiceResult;
use super::permission::{missing_permission, PermissionService};

const MAX_MEMBER_PAGE: i64 = 1000;

/// Member service
pub struct MemberService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> MemberService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Members ordered by user id; members only
    #[instrument(skip(self))]
    pub async fn list_members(
        &self,
        channel_id: Snowflake,
        user_id: Snowflake,
        after: Option<Snowflake>,
        limit: i64,
    ) -> ServiceResult<Vec<MemberResponse>> {
        PermissionService::new(self.ctx)
            .require_member(channel_id, user_id)
            .await?;

        let members = self
            .ctx
            .member_repo()
            .find_by_channel(channel_id, after, limit.clamp(1, MAX_MEMBER_PAGE))
            .await?;

        let user_ids: Vec<Snowflake> = members.iter().map(|m| m.user_id).collect();
        let mut users: HashMap<Snowflake, User> = self
            .ctx
            .user_repo()
            .find_many(&user_ids)
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect();

        Ok(members
            .into_iter()
            .map(|member| {
                let user = users.remove(&member.user_id);
                MemberResponse::from(MemberWithUser { member, user })
            })
            .collect())
    }

    #[instrument(skip(self))]
    pub async fn get_member(
        &self,
        channel_id: Snowflake,
        user_id: Snowflake,
        target_id: Snowflake,
    ) -> ServiceResult<MemberResponse> {
        PermissionService::new(self.ctx)
            .require_member(channel_id, user_id)
            .await?;

        let member = self.find_member(channel_id, target_id).await?;
        let user = self.ctx.user_repo().find_by_id(target_id).await?;
        Ok(MemberResponse::from(MemberWithUser { member, user }))
    }

    /// Add another user directly, without an invite
    #[instrument(skip(self, request), fields(target_id = %request.user_id))]
    pub async fn add_member(
        &self,
        channel_id: Snowflake,
        user_id: Snowflake,
        request: AddMemberRequest,
    ) -> ServiceResult<MemberResponse> {
        let access = PermissionService::new(self.ctx)
            .require_member(channel_id, user_id)
            .await?;
        if !access.member.can_manage_members() {
            return Err(missing_permission(MemberPermissions::MANAGE_MEMBERS));
        }

        let target_id = request.user_id;
        let user = self
            .ctx
            .user_repo()
            .find_by_id(target_id)
            .await?
            .ok_or(DomainError::UserNotFound(target_id))?;

        let count = self.ctx.member_repo().count(channel_id).await?;
        if !access.channel.has_capacity(count) {
            return Err(DomainError::ChannelFull.into());
        }

        if self.ctx.member_repo().find(channel_id, target_id).await?.is_some() {
            return Err(DomainError::AlreadyMember.into());
        }

        let role = request.role.unwrap_or(MemberRole::User);
        match role {
            MemberRole::Owner => return Err(DomainError::CannotAssignOwnerRole.into()),
            MemberRole::Moderator if !access.member.is_owner() => {
                return Err(DomainError::NotChannelOwner.into());
            }
            _ => {}
        }

        // The count above is advisory; this insert re-checks under a row lock
        let member = ChannelMember::new(channel_id, target_id, role);
        let inserted = self
            .ctx
            .member_repo()
            .create_within_capacity(&member, access.channel.max_participants)
            .await?;
        if !inserted {
            return Err(DomainError::ChannelFull.into());
        }

        info!(
            channel_id = %channel_id,
            user_id = %target_id,
            role = %role,
            added_by = %user_id,
            "Member added"
        );

        publish_member_added(self.ctx, channel_id, target_id).await;

        Ok(MemberResponse::from(MemberWithUser {
            member,
            user: Some(user),
        }))
    }

    /// Change a member's role and/or permission flags
    #[instrument(skip(self, request))]
    pub async fn update_member(
        &self,
        channel_id: Snowflake,
        user_id: Snowflake,
        target_id: Snowflake,
        request: UpdateMemberRequest,
    ) -> ServiceResult<MemberResponse> {
        let access = PermissionService::new(self.ctx)
            .require_member(channel_id, user_id)
            .await?;
        let requester = &access.member;
        let mut target = self.find_member(channel_id, target_id).await?;

        if target.is_owner() && !requester.is_owner() {
            return Err(DomainError::CannotModifyOwner.into());
        }
        if target.is_moderator() && !requester.is_owner() {
            return Err(DomainError::CannotModifyModerator.into());
        }

        if let Some(role) = request.role {
            if role == MemberRole::Owner {
                return Err(DomainError::CannotAssignOwnerRole.into());
            }
            if role != target.role {
                if target.is_owner() {
                    // The owner steps down only by transferring
                    return Err(DomainError::CannotModifyOwner.into());
                }
                if role == MemberRole::Moderator && !requester.is_owner() {
                    return Err(DomainError::NotChannelOwner.into());
                }
                if !requester.can_manage_members() {
                    return Err(missing_permission(MemberPermissions::MANAGE_MEMBERS));
                }
                target.set_role(role);
            }
        }

        if let Some(permissions) = request.permissions {
            if !requester.can_manage_members() {
                return Err(missing_permission(MemberPermissions::MANAGE_MEMBERS));
            }
            // Nobody hands out flags they do not hold themselves
            let escalated = permissions.difference(requester.permissions);
            if !requester.is_owner() && !escalated.is_empty() {
                return Err(missing_permission(escalated));
            }
            target.permissions = permissions;
        }

        self.ctx.member_repo().update(&target).await?;

        info!(
            channel_id = %channel_id,
            user_id = %target_id,
            role = %target.role,
            updated_by = %user_id,
            "Member updated"
        );

        self.ctx
            .publish(RealtimeEvent::MemberUpdated {
                channel_id,
                user_id: target_id,
            })
            .await;

        let user = self.ctx.user_repo().find_by_id(target_id).await?;
        Ok(MemberResponse::from(MemberWithUser {
            member: target,
            user,
        }))
    }

    /// Hand the channel to another member. The old owner becomes a moderator.
    #[instrument(skip(self, request), fields(target_id = %request.user_id))]
    pub async fn transfer_ownership(
        &self,
        channel_id: Snowflake,
        user_id: Snowflake,
        request: TransferOwnershipRequest,
    ) -> ServiceResult<MemberResponse> {
        let access = PermissionService::new(self.ctx)
            .require_member(channel_id, user_id)
            .await?;
        access.require_owner()?;

        let target_id = request.user_id;
        if target_id == user_id {
            return Err(DomainError::CannotTransferToSelf.into());
        }

        let mut new_owner = self.find_member(channel_id, target_id).await?;
        let mut old_owner = access.member;
        old_owner.set_role(MemberRole::Moderator);
        new_owner.set_role(MemberRole::Owner);

        self.ctx
            .member_repo()
            .transfer_ownership(&old_owner, &new_owner)
            .await?;

        info!(
            channel_id = %channel_id,
            from = %user_id,
            to = %target_id,
            "Channel ownership transferred"
        );

        for member_id in [user_id, target_id] {
            self.ctx
                .publish(RealtimeEvent::MemberUpdated {
                    channel_id,
                    user_id: member_id,
                })
                .await;
        }

        let user = self.ctx.user_repo().find_by_id(target_id).await?;
        Ok(MemberResponse::from(MemberWithUser {
            member: new_owner,
            user,
        }))
    }

    /// Kick someone, or leave when `target_id == user_id`
    #[instrument(skip(self))]
    pub async fn remove_member(
        &self,
        channel_id: Snowflake,
        user_id: Snowflake,
        target_id: Snowflake,
    ) -> ServiceResult<()> {
        let access = PermissionService::new(self.ctx)
            .require_member(channel_id, user_id)
            .await?;
        let requester = &access.member;
        let target = self.find_member(channel_id, target_id).await?;

        if target.is_owner() {
            return Err(DomainError::CannotRemoveOwner.into());
        }

        if target_id != user_id {
            if !requester.can_manage_members() {
                return Err(missing_permission(MemberPermissions::MANAGE_MEMBERS));
            }
            if target.is_moderator() && !requester.is_owner() {
                return Err(DomainError::CannotModifyModerator.into());
            }
        }

        if !self.ctx.member_repo().delete(channel_id, target_id).await? {
            return Err(DomainError::MemberNotFound.into());
        }

        info!(
            channel_id = %channel_id,
            user_id = %target_id,
            removed_by = %user_id,
            "Member removed"
        );

        self.ctx
            .publish(RealtimeEvent::MemberRemoved {
                channel_id,
                user_id: target_id,
            })
            .await;

        Ok(())
    }

    pub async fn leave_channel(&self, channel_id: Snowflake, user_id: Snowflake) -> ServiceResult<()> {
        self.remove_member(channel_id, user_id, user_id).await
    }

    async fn find_member(
        &self,
        channel_id: Snowflake,
        user_id: Snowflake,
    ) -> ServiceResult<ChannelMember> {
        Ok(self
            .ctx
            .member_repo()
            .find(channel_id, user_id)
            .await?
            .ok_or(DomainError::MemberNotFound)?)
    }
}

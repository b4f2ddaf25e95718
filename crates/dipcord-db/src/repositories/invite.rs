//! PostgreSQL implementation of InviteRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use dipcord_core::{
    ChannelInvite, ChannelMember, DomainError, InviteRedemption, InviteRepository, RepoResult,
    Snowflake,
};

use crate::models::InviteModel;

use super::error::{map_db_error, map_unique_violation};

/// PostgreSQL implementation of InviteRepository
#[derive(Clone)]
pub struct PgInviteRepository {
    pool: PgPool,
}

impl PgInviteRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InviteRepository for PgInviteRepository {
    #[instrument(skip(self))]
    async fn find_by_code(&self, code: &str) -> RepoResult<Option<ChannelInvite>> {
        let result = sqlx::query_as::<_, InviteModel>(
            r"
            SELECT id, code, channel_id, created_by_user_id, expires_at, is_used,
                   used_by_user_id, used_at, created_at
            FROM channel_invites
            WHERE code = $1
            ",
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(ChannelInvite::from))
    }

    #[instrument(skip(self))]
    async fn find_by_channel(&self, channel_id: Snowflake) -> RepoResult<Vec<ChannelInvite>> {
        let results = sqlx::query_as::<_, InviteModel>(
            r"
            SELECT id, code, channel_id, created_by_user_id, expires_at, is_used,
                   used_by_user_id, used_at, created_at
            FROM channel_invites
            WHERE channel_id = $1
            ORDER BY created_at DESC
            ",
        )
        .bind(channel_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(ChannelInvite::from).collect())
    }

    #[instrument(skip(self, invite), fields(channel_id = %invite.channel_id))]
    async fn create(&self, invite: &ChannelInvite) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO channel_invites (id, code, channel_id, created_by_user_id, expires_at,
                                         is_used, used_by_user_id, used_at, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ",
        )
        .bind(invite.id.into_inner())
        .bind(&invite.code)
        .bind(invite.channel_id.into_inner())
        .bind(invite.created_by_user_id.into_inner())
        .bind(invite.expires_at)
        .bind(invite.is_used)
        .bind(invite.used_by_user_id.map(Snowflake::into_inner))
        .bind(invite.used_at)
        .bind(invite.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, || DomainError::InviteCodeExists))?;

        Ok(())
    }

    #[instrument(skip(self, member), fields(channel_id = %member.channel_id, user_id = %member.user_id))]
    async fn redeem(
        &self,
        code: &str,
        member: &ChannelMember,
        max_participants: i32,
    ) -> RepoResult<InviteRedemption> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        // Same lock as a plain join, so invites and joins share one capacity view.
        sqlx::query("SELECT id FROM channels WHERE id = $1 FOR UPDATE")
            .bind(member.channel_id.into_inner())
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;

        let inserted = sqlx::query(
            r"
            INSERT INTO channel_members (channel_id, user_id, role, permissions, joined_at)
            SELECT $1, $2, $3, $4, $5
            WHERE (SELECT COUNT(*) FROM channel_members WHERE channel_id = $1) < $6
            ",
        )
        .bind(member.channel_id.into_inner())
        .bind(member.user_id.into_inner())
        .bind(member.role.as_str())
        .bind(member.permissions.to_i64())
        .bind(member.joined_at)
        .bind(i64::from(max_participants))
        .execute(&mut *tx)
        .await
        .map_err(|e| map_unique_violation(e, || DomainError::AlreadyMember))?
        .rows_affected();

        if inserted == 0 {
            tx.rollback().await.map_err(map_db_error)?;
            return Ok(InviteRedemption::ChannelFull);
        }

        let claimed = sqlx::query(
            r"
            UPDATE channel_invites
            SET is_used = TRUE, used_by_user_id = $2, used_at = NOW()
            WHERE code = $1 AND is_used = FALSE
            ",
        )
        .bind(code)
        .bind(member.user_id.into_inner())
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?
        .rows_affected();

        if claimed == 0 {
            tx.rollback().await.map_err(map_db_error)?;
            return Ok(InviteRedemption::AlreadyUsed);
        }

        tx.commit().await.map_err(map_db_error)?;
        Ok(InviteRedemption::Joined)
    }

    #[instrument(skip(self))]
    async fn delete(&self, code: &str) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM channel_invites WHERE code = $1")
            .bind(code)
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }
}

//! PostgreSQL implementation of MemberRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use dipcord_core::{ChannelMember, DomainError, MemberRepository, RepoResult, Snowflake};

use crate::models::MemberModel;

use super::error::{map_db_error, map_unique_violation};

/// PostgreSQL implementation of MemberRepository
#[derive(Clone)]
pub struct PgMemberRepository {
    pool: PgPool,
}

impl PgMemberRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MemberRepository for PgMemberRepository {
    #[instrument(skip(self))]
    async fn find(
        &self,
        channel_id: Snowflake,
        user_id: Snowflake,
    ) -> RepoResult<Option<ChannelMember>> {
        let result = sqlx::query_as::<_, MemberModel>(
            r"
            SELECT channel_id, user_id, role, permissions, joined_at
            FROM channel_members
            WHERE channel_id = $1 AND user_id = $2
            ",
        )
        .bind(channel_id.into_inner())
        .bind(user_id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(ChannelMember::from))
    }

    #[instrument(skip(self))]
    async fn find_by_channel(
        &self,
        channel_id: Snowflake,
        after: Option<Snowflake>,
        limit: i64,
    ) -> RepoResult<Vec<ChannelMember>> {
        let limit = limit.clamp(1, 1000);

        let results = sqlx::query_as::<_, MemberModel>(
            r"
            SELECT channel_id, user_id, role, permissions, joined_at
            FROM channel_members
            WHERE channel_id = $1 AND ($2::BIGINT IS NULL OR user_id > $2)
            ORDER BY user_id
            LIMIT $3
            ",
        )
        .bind(channel_id.into_inner())
        .bind(after.map(Snowflake::into_inner))
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(ChannelMember::from).collect())
    }

    #[instrument(skip(self))]
    async fn count(&self, channel_id: Snowflake) -> RepoResult<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM channel_members WHERE channel_id = $1")
            .bind(channel_id.into_inner())
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_error)
    }

    #[instrument(skip(self, member), fields(channel_id = %member.channel_id, user_id = %member.user_id))]
    async fn create(&self, member: &ChannelMember) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO channel_members (channel_id, user_id, role, permissions, joined_at)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(member.channel_id.into_inner())
        .bind(member.user_id.into_inner())
        .bind(member.role.as_str())
        .bind(member.permissions.to_i64())
        .bind(member.joined_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, || DomainError::AlreadyMember))?;

        Ok(())
    }

    #[instrument(skip(self, member), fields(channel_id = %member.channel_id, user_id = %member.user_id))]
    async fn create_within_capacity(
        &self,
        member: &ChannelMember,
        max_participants: i32,
    ) -> RepoResult<bool> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        // Serialise joins per channel so two racing inserts cannot both see headroom.
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

        tx.commit().await.map_err(map_db_error)?;
        Ok(inserted > 0)
    }

    #[instrument(skip(self, member), fields(channel_id = %member.channel_id, user_id = %member.user_id))]
    async fn update(&self, member: &ChannelMember) -> RepoResult<()> {
        let result = sqlx::query(
            r"
            UPDATE channel_members
            SET role = $3, permissions = $4
            WHERE channel_id = $1 AND user_id = $2
            ",
        )
        .bind(member.channel_id.into_inner())
        .bind(member.user_id.into_inner())
        .bind(member.role.as_str())
        .bind(member.permissions.to_i64())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::MemberNotFound);
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, channel_id: Snowflake, user_id: Snowflake) -> RepoResult<bool> {
        let result = sqlx::query(
            "DELETE FROM channel_members WHERE channel_id = $1 AND user_id = $2 AND role <> 'owner'",
        )
        .bind(channel_id.into_inner())
        .bind(user_id.into_inner())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, old_owner, new_owner), fields(channel_id = %old_owner.channel_id))]
    async fn transfer_ownership(
        &self,
        old_owner: &ChannelMember,
        new_owner: &ChannelMember,
    ) -> RepoResult<()> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        // Demote first: the partial unique index allows one owner at a time.
        for member in [old_owner, new_owner] {
            let result = sqlx::query(
                r"
                UPDATE channel_members
                SET role = $3, permissions = $4
                WHERE channel_id = $1 AND user_id = $2
                ",
            )
            .bind(member.channel_id.into_inner())
            .bind(member.user_id.into_inner())
            .bind(member.role.as_str())
            .bind(member.permissions.to_i64())
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;

            if result.rows_affected() == 0 {
                return Err(DomainError::MemberNotFound);
            }
        }

        tx.commit().await.map_err(map_db_error)?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn channel_ids_for_user(&self, user_id: Snowflake) -> RepoResult<Vec<Snowflake>> {
        let ids = sqlx::query_scalar::<_, i64>(
            "SELECT channel_id FROM channel_members WHERE user_id = $1 ORDER BY channel_id",
        )
        .bind(user_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(ids.into_iter().map(Snowflake::new).collect())
    }
}

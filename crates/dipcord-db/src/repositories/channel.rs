//! PostgreSQL implementation of ChannelRepository

use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::{info, instrument};

use dipcord_core::{
    Channel, ChannelCascade, ChannelMember, ChannelRepository, CursorQuery, DomainError,
    RepoResult, Snowflake,
};

use crate::models::{ChannelModel, ChannelWithCountModel};

use super::error::map_db_error;

/// PostgreSQL implementation of ChannelRepository
#[derive(Clone)]
pub struct PgChannelRepository {
    pool: PgPool,
}

impl PgChannelRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ChannelRepository for PgChannelRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Channel>> {
        let result = sqlx::query_as::<_, ChannelModel>(
            r"
            SELECT id, name, description, max_participants, access_settings, created_by,
                   created_at, updated_at
            FROM channels
            WHERE id = $1
            ",
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Channel::from))
    }

    #[instrument(skip(self))]
    async fn find_by_member(&self, user_id: Snowflake) -> RepoResult<Vec<Channel>> {
        let results = sqlx::query_as::<_, ChannelModel>(
            r"
            SELECT c.id, c.name, c.description, c.max_participants, c.access_settings,
                   c.created_by, c.created_at, c.updated_at
            FROM channels c
            INNER JOIN channel_members m ON m.channel_id = c.id
            WHERE m.user_id = $1
            ORDER BY c.name, c.id
            ",
        )
        .bind(user_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Channel::from).collect())
    }

    #[instrument(skip(self))]
    async fn find_public(&self, query: CursorQuery) -> RepoResult<Vec<(Channel, i64)>> {
        let limit = query.limit.clamp(1, 100);

        let results = sqlx::query_as::<_, ChannelWithCountModel>(
            r"
            SELECT c.id, c.name, c.description, c.max_participants, c.access_settings,
                   c.created_by, c.created_at, c.updated_at,
                   (SELECT COUNT(*) FROM channel_members m WHERE m.channel_id = c.id) AS member_count
            FROM channels c
            WHERE (c.access_settings ->> 'is_private') = 'false'
              AND ($1::BIGINT IS NULL OR c.id < $1)
            ORDER BY c.id DESC
            LIMIT $2
            ",
        )
        .bind(query.before.map(Snowflake::into_inner))
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self, channel, owner), fields(channel_id = %channel.id))]
    async fn create_with_owner(&self, channel: &Channel, owner: &ChannelMember) -> RepoResult<()> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        sqlx::query(
            r"
            INSERT INTO channels (id, name, description, max_participants, access_settings,
                                  created_by, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ",
        )
        .bind(channel.id.into_inner())
        .bind(&channel.name)
        .bind(&channel.description)
        .bind(channel.max_participants)
        .bind(Json(channel.access))
        .bind(channel.created_by.into_inner())
        .bind(channel.created_at)
        .bind(channel.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        sqlx::query(
            r"
            INSERT INTO channel_members (channel_id, user_id, role, permissions, joined_at)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(owner.channel_id.into_inner())
        .bind(owner.user_id.into_inner())
        .bind(owner.role.as_str())
        .bind(owner.permissions.to_i64())
        .bind(owner.joined_at)
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        tx.commit().await.map_err(map_db_error)?;
        Ok(())
    }

    #[instrument(skip(self, channel), fields(channel_id = %channel.id))]
    async fn update(&self, channel: &Channel) -> RepoResult<()> {
        let result = sqlx::query(
            r"
            UPDATE channels
            SET name = $2, description = $3, max_participants = $4, access_settings = $5,
                updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(channel.id.into_inner())
        .bind(&channel.name)
        .bind(&channel.description)
        .bind(channel.max_participants)
        .bind(Json(channel.access))
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::ChannelNotFound(channel.id));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_cascade(&self, id: Snowflake) -> RepoResult<ChannelCascade> {
        let channel_id = id.into_inner();
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;
        let mut cascade = ChannelCascade::default();

        // Children first; every statement is scoped to this channel's rows.
        for sql in [
            "DELETE FROM message_reactions WHERE message_id IN (SELECT id FROM messages WHERE channel_id = $1)",
            "DELETE FROM message_mentions WHERE message_id IN (SELECT id FROM messages WHERE channel_id = $1)",
            "DELETE FROM message_attachments WHERE message_id IN (SELECT id FROM messages WHERE channel_id = $1)",
        ] {
            sqlx::query(sql)
                .bind(channel_id)
                .execute(&mut *tx)
                .await
                .map_err(map_db_error)?;
        }

        cascade.messages = sqlx::query("DELETE FROM messages WHERE channel_id = $1")
            .bind(channel_id)
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?
            .rows_affected();

        for sql in [
            "DELETE FROM poll_votes WHERE poll_id IN (SELECT id FROM polls WHERE channel_id = $1)",
            "DELETE FROM poll_options WHERE poll_id IN (SELECT id FROM polls WHERE channel_id = $1)",
        ] {
            sqlx::query(sql)
                .bind(channel_id)
                .execute(&mut *tx)
                .await
                .map_err(map_db_error)?;
        }

        cascade.polls = sqlx::query("DELETE FROM polls WHERE channel_id = $1")
            .bind(channel_id)
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?
            .rows_affected();

        cascade.tasks = sqlx::query("DELETE FROM tasks WHERE channel_id = $1")
            .bind(channel_id)
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?
            .rows_affected();

        cascade.invites = sqlx::query("DELETE FROM channel_invites WHERE channel_id = $1")
            .bind(channel_id)
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?
            .rows_affected();

        cascade.members = sqlx::query("DELETE FROM channel_members WHERE channel_id = $1")
            .bind(channel_id)
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?
            .rows_affected();

        let removed = sqlx::query("DELETE FROM channels WHERE id = $1")
            .bind(channel_id)
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?
            .rows_affected();

        if removed == 0 {
            // Dropping `tx` rolls everything back
            return Err(DomainError::ChannelNotFound(id));
        }

        tx.commit().await.map_err(map_db_error)?;

        info!(
            channel_id = %id,
            messages = cascade.messages,
            members = cascade.members,
            tasks = cascade.tasks,
            polls = cascade.polls,
            "Channel cascade deleted"
        );
        Ok(cascade)
    }
}

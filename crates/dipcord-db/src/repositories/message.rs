//! PostgreSQL implementation of MessageRepository

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use dipcord_core::{
    CursorQuery, DomainError, Message, MessageAttachment, MessageMention, MessageRepository,
    NewMessage, RepoResult, Snowflake,
};

use crate::mappers::raw_ids;
use crate::models::{AttachmentModel, MentionModel, MessageModel, ReplyCountModel};

use super::error::map_db_error;

/// PostgreSQL implementation of MessageRepository
#[derive(Clone)]
pub struct PgMessageRepository {
    pool: PgPool,
}

impl PgMessageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageRepository for PgMessageRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Message>> {
        let result = sqlx::query_as::<_, MessageModel>(
            r"
            SELECT id, channel_id, user_id, content, parent_message_id, is_edited, is_deleted,
                   created_at, updated_at
            FROM messages
            WHERE id = $1
            ",
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Message::from))
    }

    #[instrument(skip(self))]
    async fn find_by_channel(
        &self,
        channel_id: Snowflake,
        query: CursorQuery,
    ) -> RepoResult<Vec<Message>> {
        let limit = query.limit.clamp(1, 100);

        // `after` pages forward, so fetch ascending and flip back to newest first
        let results = if let Some(after) = query.after {
            let mut rows = sqlx::query_as::<_, MessageModel>(
                r"
                SELECT id, channel_id, user_id, content, parent_message_id, is_edited,
                       is_deleted, created_at, updated_at
                FROM messages
                WHERE channel_id = $1 AND parent_message_id IS NULL AND id > $2
                ORDER BY id ASC
                LIMIT $3
                ",
            )
            .bind(channel_id.into_inner())
            .bind(after.into_inner())
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;
            rows.reverse();
            rows
        } else {
            sqlx::query_as::<_, MessageModel>(
                r"
                SELECT id, channel_id, user_id, content, parent_message_id, is_edited,
                       is_deleted, created_at, updated_at
                FROM messages
                WHERE channel_id = $1 AND parent_message_id IS NULL
                  AND ($2::BIGINT IS NULL OR id < $2)
                ORDER BY id DESC
                LIMIT $3
                ",
            )
            .bind(channel_id.into_inner())
            .bind(query.before.map(Snowflake::into_inner))
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?
        };

        Ok(results.into_iter().map(Message::from).collect())
    }

    #[instrument(skip(self))]
    async fn find_replies(
        &self,
        parent_id: Snowflake,
        query: CursorQuery,
    ) -> RepoResult<Vec<Message>> {
        let limit = query.limit.clamp(1, 100);

        let results = sqlx::query_as::<_, MessageModel>(
            r"
            SELECT id, channel_id, user_id, content, parent_message_id, is_edited, is_deleted,
                   created_at, updated_at
            FROM messages
            WHERE parent_message_id = $1
              AND ($2::BIGINT IS NULL OR id > $2)
              AND ($3::BIGINT IS NULL OR id < $3)
            ORDER BY id ASC
            LIMIT $4
            ",
        )
        .bind(parent_id.into_inner())
        .bind(query.after.map(Snowflake::into_inner))
        .bind(query.before.map(Snowflake::into_inner))
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Message::from).collect())
    }

    #[instrument(skip(self, ids), fields(count = ids.len()))]
    async fn reply_counts(&self, ids: &[Snowflake]) -> RepoResult<HashMap<Snowflake, i64>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, ReplyCountModel>(
            r"
            SELECT parent_message_id, COUNT(*) AS reply_count
            FROM messages
            WHERE parent_message_id = ANY($1) AND is_deleted = FALSE
            GROUP BY parent_message_id
            ",
        )
        .bind(raw_ids(ids))
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(rows
            .into_iter()
            .map(|row| (Snowflake::new(row.parent_message_id), row.reply_count))
            .collect())
    }

    #[instrument(skip(self, new), fields(message_id = %new.message.id))]
    async fn create(&self, new: &NewMessage) -> RepoResult<()> {
        let message = &new.message;
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        sqlx::query(
            r"
            INSERT INTO messages (id, channel_id, user_id, content, parent_message_id,
                                  is_edited, is_deleted, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ",
        )
        .bind(message.id.into_inner())
        .bind(message.channel_id.into_inner())
        .bind(message.user_id.into_inner())
        .bind(&message.content)
        .bind(message.parent_message_id.map(Snowflake::into_inner))
        .bind(message.is_edited)
        .bind(message.is_deleted)
        .bind(message.created_at)
        .bind(message.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        for attachment in &new.attachments {
            sqlx::query(
                r"
                INSERT INTO message_attachments (id, message_id, filename, url, content_type, size_bytes)
                VALUES ($1, $2, $3, $4, $5, $6)
                ",
            )
            .bind(attachment.id.into_inner())
            .bind(message.id.into_inner())
            .bind(&attachment.filename)
            .bind(&attachment.url)
            .bind(&attachment.content_type)
            .bind(attachment.size_bytes)
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;
        }

        if !new.mentions.is_empty() {
            sqlx::query(
                r"
                INSERT INTO message_mentions (message_id, user_id)
                SELECT $1, UNNEST($2::BIGINT[])
                ON CONFLICT DO NOTHING
                ",
            )
            .bind(message.id.into_inner())
            .bind(raw_ids(&new.mentions))
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;
        }

        tx.commit().await.map_err(map_db_error)?;
        Ok(())
    }

    #[instrument(skip(self, message), fields(message_id = %message.id))]
    async fn update(&self, message: &Message) -> RepoResult<()> {
        let result = sqlx::query(
            r"
            UPDATE messages
            SET content = $2, is_edited = $3, updated_at = $4
            WHERE id = $1 AND is_deleted = FALSE
            ",
        )
        .bind(message.id.into_inner())
        .bind(&message.content)
        .bind(message.is_edited)
        .bind(message.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::MessageNotFound(message.id));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn soft_delete(&self, id: Snowflake) -> RepoResult<()> {
        let result = sqlx::query(
            r"
            UPDATE messages
            SET is_deleted = TRUE, content = '', updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(id.into_inner())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::MessageNotFound(id));
        }

        Ok(())
    }

    #[instrument(skip(self, message_ids), fields(count = message_ids.len()))]
    async fn find_attachments(
        &self,
        message_ids: &[Snowflake],
    ) -> RepoResult<Vec<MessageAttachment>> {
        if message_ids.is_empty() {
            return Ok(Vec::new());
        }

        let results = sqlx::query_as::<_, AttachmentModel>(
            r"
            SELECT id, message_id, filename, url, content_type, size_bytes
            FROM message_attachments
            WHERE message_id = ANY($1)
            ORDER BY id
            ",
        )
        .bind(raw_ids(message_ids))
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(MessageAttachment::from).collect())
    }

    #[instrument(skip(self, message_ids), fields(count = message_ids.len()))]
    async fn find_mentions(&self, message_ids: &[Snowflake]) -> RepoResult<Vec<MessageMention>> {
        if message_ids.is_empty() {
            return Ok(Vec::new());
        }

        let results = sqlx::query_as::<_, MentionModel>(
            "SELECT message_id, user_id FROM message_mentions WHERE message_id = ANY($1)",
        )
        .bind(raw_ids(message_ids))
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(MessageMention::from).collect())
    }
}

//! PostgreSQL implementation of ReactionRepository

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use dipcord_core::{
    DomainError, MessageReaction, ReactionRepository, ReactionSummary, RepoResult, Snowflake,
};

use crate::mappers::raw_ids;
use crate::models::{ReactionCountModel, ReactionModel};

use super::error::{map_db_error, map_unique_violation};

/// PostgreSQL implementation of ReactionRepository
#[derive(Clone)]
pub struct PgReactionRepository {
    pool: PgPool,
}

impl PgReactionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReactionRepository for PgReactionRepository {
    #[instrument(skip(self))]
    async fn find(
        &self,
        message_id: Snowflake,
        user_id: Snowflake,
        emoji: &str,
    ) -> RepoResult<Option<MessageReaction>> {
        let result = sqlx::query_as::<_, ReactionModel>(
            r"
            SELECT message_id, user_id, emoji, created_at
            FROM message_reactions
            WHERE message_id = $1 AND user_id = $2 AND emoji = $3
            ",
        )
        .bind(message_id.into_inner())
        .bind(user_id.into_inner())
        .bind(emoji)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(MessageReaction::from))
    }

    #[instrument(skip(self, reaction), fields(message_id = %reaction.message_id))]
    async fn create(&self, reaction: &MessageReaction) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO message_reactions (message_id, user_id, emoji, created_at)
            VALUES ($1, $2, $3, $4)
            ",
        )
        .bind(reaction.message_id.into_inner())
        .bind(reaction.user_id.into_inner())
        .bind(&reaction.emoji)
        .bind(reaction.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, || DomainError::ReactionAlreadyExists))?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(
        &self,
        message_id: Snowflake,
        user_id: Snowflake,
        emoji: &str,
    ) -> RepoResult<bool> {
        let result = sqlx::query(
            "DELETE FROM message_reactions WHERE message_id = $1 AND user_id = $2 AND emoji = $3",
        )
        .bind(message_id.into_inner())
        .bind(user_id.into_inner())
        .bind(emoji)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, message_ids), fields(count = message_ids.len()))]
    async fn summarize(
        &self,
        message_ids: &[Snowflake],
        viewer: Snowflake,
    ) -> RepoResult<HashMap<Snowflake, Vec<ReactionSummary>>> {
        if message_ids.is_empty() {
            return Ok(HashMap::new());
        }

        // Emoji order within a message follows the first reaction of each kind
        let rows = sqlx::query_as::<_, ReactionCountModel>(
            r"
            SELECT message_id, emoji, COUNT(*) AS count, BOOL_OR(user_id = $2) AS me
            FROM message_reactions
            WHERE message_id = ANY($1)
            GROUP BY message_id, emoji
            ORDER BY message_id, MIN(created_at), emoji
            ",
        )
        .bind(raw_ids(message_ids))
        .bind(viewer.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        let mut summaries: HashMap<Snowflake, Vec<ReactionSummary>> = HashMap::new();
        for row in rows {
            summaries
                .entry(Snowflake::new(row.message_id))
                .or_default()
                .push(ReactionSummary::from(row));
        }

        Ok(summaries)
    }
}

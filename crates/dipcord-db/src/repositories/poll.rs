//! PostgreSQL implementation of PollRepository

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use dipcord_core::{
    CursorQuery, Poll, PollOption, PollRepository, PollVote, RepoResult, Snowflake,
};

use crate::mappers::raw_ids;
use crate::models::{OptionCountModel, PollModel, PollOptionModel, PollVoteModel, VoterCountModel};

use super::error::map_db_error;

/// PostgreSQL implementation of PollRepository
#[derive(Clone)]
pub struct PgPollRepository {
    pool: PgPool,
}

impl PgPollRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PollRepository for PgPollRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Poll>> {
        let result = sqlx::query_as::<_, PollModel>(
            r"
            SELECT id, channel_id, created_by, question, allow_multiple, closes_at, is_closed,
                   created_at
            FROM polls
            WHERE id = $1
            ",
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Poll::from))
    }

    #[instrument(skip(self))]
    async fn find_by_channel(
        &self,
        channel_id: Snowflake,
        query: CursorQuery,
    ) -> RepoResult<Vec<Poll>> {
        let limit = query.limit.clamp(1, 100);

        let results = sqlx::query_as::<_, PollModel>(
            r"
            SELECT id, channel_id, created_by, question, allow_multiple, closes_at, is_closed,
                   created_at
            FROM polls
            WHERE channel_id = $1 AND ($2::BIGINT IS NULL OR id < $2)
            ORDER BY id DESC
            LIMIT $3
            ",
        )
        .bind(channel_id.into_inner())
        .bind(query.before.map(Snowflake::into_inner))
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Poll::from).collect())
    }

    #[instrument(skip(self, poll_ids), fields(count = poll_ids.len()))]
    async fn find_options(&self, poll_ids: &[Snowflake]) -> RepoResult<Vec<PollOption>> {
        if poll_ids.is_empty() {
            return Ok(Vec::new());
        }

        let results = sqlx::query_as::<_, PollOptionModel>(
            r"
            SELECT id, poll_id, text, position
            FROM poll_options
            WHERE poll_id = ANY($1)
            ORDER BY poll_id, position
            ",
        )
        .bind(raw_ids(poll_ids))
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(PollOption::from).collect())
    }

    #[instrument(skip(self, poll, options), fields(poll_id = %poll.id, options = options.len()))]
    async fn create(&self, poll: &Poll, options: &[PollOption]) -> RepoResult<()> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        sqlx::query(
            r"
            INSERT INTO polls (id, channel_id, created_by, question, allow_multiple, closes_at,
                               is_closed, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ",
        )
        .bind(poll.id.into_inner())
        .bind(poll.channel_id.into_inner())
        .bind(poll.created_by.into_inner())
        .bind(&poll.question)
        .bind(poll.allow_multiple)
        .bind(poll.closes_at)
        .bind(poll.is_closed)
        .bind(poll.created_at)
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        for option in options {
            sqlx::query(
                "INSERT INTO poll_options (id, poll_id, text, position) VALUES ($1, $2, $3, $4)",
            )
            .bind(option.id.into_inner())
            .bind(poll.id.into_inner())
            .bind(&option.text)
            .bind(option.position)
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;
        }

        tx.commit().await.map_err(map_db_error)?;
        Ok(())
    }

    #[instrument(skip(self, poll_ids), fields(count = poll_ids.len()))]
    async fn vote_counts(&self, poll_ids: &[Snowflake]) -> RepoResult<HashMap<Snowflake, i64>> {
        if poll_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, OptionCountModel>(
            r"
            SELECT option_id, COUNT(*) AS votes
            FROM poll_votes
            WHERE poll_id = ANY($1)
            GROUP BY option_id
            ",
        )
        .bind(raw_ids(poll_ids))
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(rows
            .into_iter()
            .map(|row| (Snowflake::new(row.option_id), row.votes))
            .collect())
    }

    #[instrument(skip(self, poll_ids), fields(count = poll_ids.len()))]
    async fn voter_counts(&self, poll_ids: &[Snowflake]) -> RepoResult<HashMap<Snowflake, i64>> {
        if poll_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, VoterCountModel>(
            r"
            SELECT poll_id, COUNT(DISTINCT user_id) AS voters
            FROM poll_votes
            WHERE poll_id = ANY($1)
            GROUP BY poll_id
            ",
        )
        .bind(raw_ids(poll_ids))
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(rows
            .into_iter()
            .map(|row| (Snowflake::new(row.poll_id), row.voters))
            .collect())
    }

    #[instrument(skip(self, poll_ids), fields(count = poll_ids.len()))]
    async fn votes_for_user(
        &self,
        poll_ids: &[Snowflake],
        user_id: Snowflake,
    ) -> RepoResult<Vec<PollVote>> {
        if poll_ids.is_empty() {
            return Ok(Vec::new());
        }

        let results = sqlx::query_as::<_, PollVoteModel>(
            "SELECT poll_id, option_id, user_id FROM poll_votes WHERE poll_id = ANY($1) AND user_id = $2",
        )
        .bind(raw_ids(poll_ids))
        .bind(user_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(PollVote::from).collect())
    }

    #[instrument(skip(self, option_ids), fields(options = option_ids.len()))]
    async fn replace_votes(
        &self,
        poll_id: Snowflake,
        user_id: Snowflake,
        option_ids: &[Snowflake],
    ) -> RepoResult<()> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        sqlx::query("DELETE FROM poll_votes WHERE poll_id = $1 AND user_id = $2")
            .bind(poll_id.into_inner())
            .bind(user_id.into_inner())
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;

        sqlx::query(
            r"
            INSERT INTO poll_votes (poll_id, option_id, user_id)
            SELECT $1, UNNEST($2::BIGINT[]), $3
            ON CONFLICT DO NOTHING
            ",
        )
        .bind(poll_id.into_inner())
        .bind(raw_ids(option_ids))
        .bind(user_id.into_inner())
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        tx.commit().await.map_err(map_db_error)?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn clear_votes(&self, poll_id: Snowflake, user_id: Snowflake) -> RepoResult<u64> {
        let result = sqlx::query("DELETE FROM poll_votes WHERE poll_id = $1 AND user_id = $2")
            .bind(poll_id.into_inner())
            .bind(user_id.into_inner())
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(result.rows_affected())
    }

    #[instrument(skip(self))]
    async fn close(&self, poll_id: Snowflake) -> RepoResult<bool> {
        let result = sqlx::query("UPDATE polls SET is_closed = TRUE WHERE id = $1 AND is_closed = FALSE")
            .bind(poll_id.into_inner())
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }
}

//! Poll service
//!
//! Single- and multiple-choice polls with optional deadlines. A vote replaces
//! whatever the voter picked before.

use std::collections::HashSet;

use chrono::Utc;
use dipcord_core::{
    CursorQuery, DomainError, MemberPermissions, Poll, PollOption, RealtimeEvent, Snowflake,
};
use tracing::{debug, info, instrument};
use validator::Validate;

use crate::dto::{CreatePollRequest, PollResponse, PollWithResults, VoteRequest};

use super::context::ServiceContext;
use super::error::ServiceResult;
use super::permission::{missing_permission, PermissionService};

/// Poll service
pub struct PollService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> PollService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Requires `CREATE_POLLS`
    #[instrument(skip(self, request))]
    pub async fn create_poll(
        &self,
        channel_id: Snowflake,
        user_id: Snowflake,
        request: CreatePollRequest,
    ) -> ServiceResult<PollResponse> {
        let texts = normalize_options(&request.options)?;
        request.validate()?;

        if request.closes_at.is_some_and(|at| at <= Utc::now()) {
            return Err(DomainError::ValidationError("closes_at must be in the future".into()).into());
        }

        PermissionService::new(self.ctx)
            .require_permission(channel_id, user_id, MemberPermissions::CREATE_POLLS)
            .await?;

        let mut poll = Poll::new(
            self.ctx.generate_id(),
            channel_id,
            user_id,
            request.question.trim().to_string(),
        );
        poll.allow_multiple = request.allow_multiple;
        poll.closes_at = request.closes_at;

        let options: Vec<PollOption> = texts
            .into_iter()
            .zip(0..)
            .map(|(text, position)| PollOption {
                id: self.ctx.generate_id(),
                poll_id: poll.id,
                text,
                position,
            })
            .collect();

        self.ctx.poll_repo().create(&poll, &options).await?;

        info!(
            poll_id = %poll.id,
            channel_id = %channel_id,
            options = options.len(),
            "Poll created"
        );

        self.ctx
            .publish(RealtimeEvent::PollCreated {
                channel_id,
                poll_id: poll.id,
            })
            .await;

        Ok(PollResponse::from(PollWithResults {
            poll,
            options,
            vote_counts: Default::default(),
            my_votes: Vec::new(),
            total_voters: 0,
        }))
    }

    /// Polls of a channel, newest first, with results
    #[instrument(skip(self))]
    pub async fn list_polls(
        &self,
        channel_id: Snowflake,
        user_id: Snowflake,
        query: CursorQuery,
    ) -> ServiceResult<Vec<PollResponse>> {
        PermissionService::new(self.ctx)
            .require_member(channel_id, user_id)
            .await?;

        let polls = self
            .ctx
            .poll_repo()
            .find_by_channel(channel_id, query)
            .await?;
        self.with_results(polls, user_id).await
    }

    #[instrument(skip(self))]
    pub async fn get_poll(&self, poll_id: Snowflake, user_id: Snowflake) -> ServiceResult<PollResponse> {
        let poll = self.find_poll(poll_id).await?;
        PermissionService::new(self.ctx)
            .require_member(poll.channel_id, user_id)
            .await?;
        self.with_results_one(poll, user_id).await
    }

    /// Cast or replace the requester's ballot
    #[instrument(skip(self, request))]
    pub async fn vote(
        &self,
        poll_id: Snowflake,
        user_id: Snowflake,
        request: VoteRequest,
    ) -> ServiceResult<PollResponse> {
        let poll = self.find_poll(poll_id).await?;
        PermissionService::new(self.ctx)
            .require_member(poll.channel_id, user_id)
            .await?;

        if !poll.is_open() {
            return Err(DomainError::PollClosed.into());
        }

        let mut selection = request.option_ids;
        selection.sort_unstable();
        selection.dedup();
        if !poll.accepts_selection(selection.len()) {
            return Err(DomainError::InvalidVoteSelection.into());
        }

        let options = self.ctx.poll_repo().find_options(&[poll_id]).await?;
        let known: HashSet<Snowflake> = options.iter().map(|o| o.id).collect();
        if selection.iter().any(|id| !known.contains(id)) {
            return Err(DomainError::ForeignPollOption.into());
        }

        self.ctx
            .poll_repo()
            .replace_votes(poll_id, user_id, &selection)
            .await?;

        debug!(poll_id = %poll_id, user_id = %user_id, picked = selection.len(), "Vote recorded");

        self.ctx
            .publish(RealtimeEvent::PollVoted {
                channel_id: poll.channel_id,
                poll_id,
            })
            .await;

        self.with_results_one(poll, user_id).await
    }

    /// Drop the requester's ballot
    #[instrument(skip(self))]
    pub async fn retract_vote(&self, poll_id: Snowflake, user_id: Snowflake) -> ServiceResult<PollResponse> {
        let poll = self.find_poll(poll_id).await?;
        PermissionService::new(self.ctx)
            .require_member(poll.channel_id, user_id)
            .await?;

        if !poll.is_open() {
            return Err(DomainError::PollClosed.into());
        }

        let removed = self.ctx.poll_repo().clear_votes(poll_id, user_id).await?;
        if removed > 0 {
            self.ctx
                .publish(RealtimeEvent::PollVoted {
                    channel_id: poll.channel_id,
                    poll_id,
                })
                .await;
        }

        self.with_results_one(poll, user_id).await
    }

    /// The creator or `MANAGE_MESSAGES`. Closing a closed poll is a no-op.
    #[instrument(skip(self))]
    pub async fn close_poll(&self, poll_id: Snowflake, user_id: Snowflake) -> ServiceResult<PollResponse> {
        let mut poll = self.find_poll(poll_id).await?;
        let access = PermissionService::new(self.ctx)
            .require_member(poll.channel_id, user_id)
            .await?;

        if poll.created_by != user_id && !access.member.can(MemberPermissions::MANAGE_MESSAGES) {
            return Err(missing_permission(MemberPermissions::MANAGE_MESSAGES));
        }

        if self.ctx.poll_repo().close(poll_id).await? {
            info!(poll_id = %poll_id, closed_by = %user_id, "Poll closed");

            self.ctx
                .publish(RealtimeEvent::PollClosed {
                    channel_id: poll.channel_id,
                    poll_id,
                })
                .await;
        }
        poll.is_closed = true;

        self.with_results_one(poll, user_id).await
    }

    async fn find_poll(&self, poll_id: Snowflake) -> ServiceResult<Poll> {
        Ok(self
            .ctx
            .poll_repo()
            .find_by_id(poll_id)
            .await?
            .ok_or(DomainError::PollNotFound(poll_id))?)
    }

    async fn with_results_one(&self, poll: Poll, viewer: Snowflake) -> ServiceResult<PollResponse> {
        let id = poll.id;
        self.with_results(vec![poll], viewer)
            .await?
            .pop()
            .ok_or_else(|| DomainError::PollNotFound(id).into())
    }

    /// Options, counts, voters and the viewer's picks for a page of polls
    async fn with_results(&self, polls: Vec<Poll>, viewer: Snowflake) -> ServiceResult<Vec<PollResponse>> {
        if polls.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Snowflake> = polls.iter().map(|p| p.id).collect();
        let repo = self.ctx.poll_repo();

        let options = repo.find_options(&ids).await?;
        let vote_counts = repo.vote_counts(&ids).await?;
        let voter_counts = repo.voter_counts(&ids).await?;
        let my_votes = repo.votes_for_user(&ids, viewer).await?;

        Ok(polls
            .into_iter()
            .map(|poll| {
                let id = poll.id;
                let options: Vec<PollOption> =
                    options.iter().filter(|o| o.poll_id == id).cloned().collect();
                let vote_counts = options
                    .iter()
                    .filter_map(|o| vote_counts.get(&o.id).map(|count| (o.id, *count)))
                    .collect();
                PollResponse::from(PollWithResults {
                    options,
                    vote_counts,
                    my_votes: my_votes
                        .iter()
                        .filter(|v| v.poll_id == id)
                        .map(|v| v.option_id)
                        .collect(),
                    total_voters: voter_counts.get(&id).copied().unwrap_or(0),
                    poll,
                })
            })
            .collect())
    }
}

/// Trimmed option texts; 2..=10 of them, none blank, no duplicates
fn normalize_options(options: &[String]) -> ServiceResult<Vec<String>> {
    if options.len() < Poll::MIN_OPTIONS || options.len() > Poll::MAX_OPTIONS {
        return Err(DomainError::InvalidPollOptions(format!(
            "a poll needs {} to {} options",
            Poll::MIN_OPTIONS,
            Poll::MAX_OPTIONS
        ))
        .into());
    }

    let mut seen = HashSet::new();
    let mut texts = Vec::with_capacity(options.len());
    for option in options {
        let text = option.trim();
        if text.is_empty() {
            return Err(DomainError::InvalidPollOptions("options cannot be blank".into()).into());
        }
        if !seen.insert(text.to_lowercase()) {
            return Err(DomainError::InvalidPollOptions(format!("duplicate option: {text}")).into());
        }
        texts.push(text.to_string());
    }
    Ok(texts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::TestHarness;
    use dipcord_core::MemberRole;

    fn lunch_poll(allow_multiple: bool) -> CreatePollRequest {
        CreatePollRequest {
            question: "Lunch?".to_string(),
            options: strings(&["Pizza", "Sushi", "Tacos"]),
            allow_multiple,
            closes_at: None,
        }
    }

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_options_are_trimmed() {
        let texts = normalize_options(&strings(&[" Pizza ", "Sushi"])).unwrap();
        assert_eq!(texts, vec!["Pizza", "Sushi"]);
    }

    #[test]
    fn test_option_count_bounds() {
        assert!(normalize_options(&strings(&["Only"])).is_err());

        let eleven: Vec<String> = (0..11).map(|i| format!("opt {i}")).collect();
        let err = normalize_options(&eleven).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_POLL_OPTIONS");
    }

    #[test]
    fn test_blank_and_duplicate_options_rejected() {
        assert!(normalize_options(&strings(&["Pizza", "  "])).is_err());
        assert!(normalize_options(&strings(&["Pizza", "pizza "])).is_err());
    }

    #[tokio::test]
    async fn test_vote_replaces_previous_ballot() {
        let h = TestHarness::new();
        let owner = h.user("Owner");
        let voter = h.user("Voter");
        let channel = h.channel(owner, 10, false);
        h.join(channel, voter, MemberRole::User);

        let service = PollService::new(&h.ctx);
        let poll = service.create_poll(channel, owner, lunch_poll(false)).await.unwrap();
        let pizza = poll.options[0].id;
        let sushi = poll.options[1].id;

        service
            .vote(poll.id, voter, VoteRequest { option_ids: vec![pizza] })
            .await
            .unwrap();
        let result = service
            .vote(poll.id, voter, VoteRequest { option_ids: vec![sushi] })
            .await
            .unwrap();

        assert_eq!(result.my_votes, vec![sushi]);
        assert_eq!(result.total_voters, 1);
        assert_eq!(result.options[0].votes, 0);
        assert_eq!(result.options[1].votes, 1);
    }

    #[tokio::test]
    async fn test_listed_polls_keep_their_own_tallies() {
        let h = TestHarness::new();
        let owner = h.user("Owner");
        let voter = h.user("Voter");
        let channel = h.channel(owner, 10, false);
        h.join(channel, voter, MemberRole::User);

        let service = PollService::new(&h.ctx);
        let lunch = service.create_poll(channel, owner, lunch_poll(true)).await.unwrap();
        let dinner = service.create_poll(channel, owner, lunch_poll(true)).await.unwrap();

        let picks = vec![lunch.options[0].id, lunch.options[2].id];
        service
            .vote(lunch.id, voter, VoteRequest { option_ids: picks })
            .await
            .unwrap();
        service
            .vote(dinner.id, owner, VoteRequest { option_ids: vec![dinner.options[1].id] })
            .await
            .unwrap();

        let polls = service
            .list_polls(channel, owner, CursorQuery::default())
            .await
            .unwrap();
        assert_eq!(polls.len(), 2);

        let tallies = |id: Snowflake| -> Vec<i64> {
            let poll = polls.iter().find(|p| p.id == id).unwrap();
            poll.options.iter().map(|o| o.votes).collect()
        };
        assert_eq!(tallies(lunch.id), vec![1, 0, 1]);
        assert_eq!(tallies(dinner.id), vec![0, 1, 0]);
    }

    #[tokio::test]
    async fn test_single_choice_rejects_multiple_options() {
        let h = TestHarness::new();
        let owner = h.user("Owner");
        let channel = h.channel(owner, 10, false);

        let service = PollService::new(&h.ctx);
        let poll = service.create_poll(channel, owner, lunch_poll(false)).await.unwrap();
        let both = vec![poll.options[0].id, poll.options[1].id];

        let err = service
            .vote(poll.id, owner, VoteRequest { option_ids: both })
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "INVALID_VOTE_SELECTION");

        let err = service
            .vote(poll.id, owner, VoteRequest { option_ids: vec![Snowflake::new(1)] })
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[tokio::test]
    async fn test_closed_poll_rejects_votes() {
        let h = TestHarness::new();
        let owner = h.user("Owner");
        let user = h.user("User");
        let channel = h.channel(owner, 10, false);
        h.join(channel, user, MemberRole::User);

        let service = PollService::new(&h.ctx);
        let poll = service.create_poll(channel, owner, lunch_poll(true)).await.unwrap();

        let err = service.close_poll(poll.id, user).await.unwrap_err();
        assert_eq!(err.status_code(), 403);

        let closed = service.close_poll(poll.id, owner).await.unwrap();
        assert!(!closed.is_open);
        service.close_poll(poll.id, owner).await.unwrap();

        let err = service
            .vote(poll.id, user, VoteRequest { option_ids: vec![poll.options[0].id] })
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "POLL_CLOSED");

        let closes = h.events.names().iter().filter(|n| **n == "poll:closed").count();
        assert_eq!(closes, 1);
    }
}

//! Service context - dependency container for services
//!
//! Holds all repositories, cache stores, and other dependencies needed by services.

use std::sync::Arc;

use dipcord_cache::{EventPublisher, Publisher, RefreshTokenStore, SharedRedisPool};
use dipcord_common::JwtService;
use dipcord_core::{
    ChannelRepository, InviteRepository, MemberRepository, MessageRepository, PollRepository,
    RealtimeEvent, ReactionRepository, Snowflake, SnowflakeGenerator, TaskRepository,
    UserRepository,
};
use dipcord_db::PgPool;

use super::error::{ServiceError, ServiceResult};

/// Service context containing all dependencies
///
/// Cheap to clone; everything inside is reference counted.
#[derive(Clone)]
pub struct ServiceContext {
    pool: PgPool,
    redis_pool: SharedRedisPool,

    // Repositories
    user_repo: Arc<dyn UserRepository>,
    channel_repo: Arc<dyn ChannelRepository>,
    member_repo: Arc<dyn MemberRepository>,
    invite_repo: Arc<dyn InviteRepository>,
    message_repo: Arc<dyn MessageRepository>,
    reaction_repo: Arc<dyn ReactionRepository>,
    task_repo: Arc<dyn TaskRepository>,
    poll_repo: Arc<dyn PollRepository>,

    refresh_token_store: RefreshTokenStore,
    publisher: Arc<dyn EventPublisher>,

    jwt_service: Arc<JwtService>,
    snowflake_generator: Arc<SnowflakeGenerator>,
}

impl ServiceContext {
    pub fn builder() -> ServiceContextBuilder {
        ServiceContextBuilder::new()
    }

    // === Pools ===

    /// PostgreSQL connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn redis_pool(&self) -> &SharedRedisPool {
        &self.redis_pool
    }

    // === Repositories ===

    pub fn user_repo(&self) -> &dyn UserRepository {
        self.user_repo.as_ref()
    }

    pub fn channel_repo(&self) -> &dyn ChannelRepository {
        self.channel_repo.as_ref()
    }

    pub fn member_repo(&self) -> &dyn MemberRepository {
        self.member_repo.as_ref()
    }

    pub fn invite_repo(&self) -> &dyn InviteRepository {
        self.invite_repo.as_ref()
    }

    pub fn message_repo(&self) -> &dyn MessageRepository {
        self.message_repo.as_ref()
    }

    pub fn reaction_repo(&self) -> &dyn ReactionRepository {
        self.reaction_repo.as_ref()
    }

    pub fn task_repo(&self) -> &dyn TaskRepository {
        self.task_repo.as_ref()
    }

    pub fn poll_repo(&self) -> &dyn PollRepository {
        self.poll_repo.as_ref()
    }

    // === Cache ===

    pub fn refresh_token_store(&self) -> &RefreshTokenStore {
        &self.refresh_token_store
    }

    pub fn publisher(&self) -> &dyn EventPublisher {
        self.publisher.as_ref()
    }

    /// Publish without failing the caller. Clients only refetch on events,
    /// so a lost event costs freshness, never correctness.
    pub async fn publish(&self, event: RealtimeEvent) {
        if let Err(e) = self.publisher.publish_event(&event).await {
            tracing::warn!(event = event.name(), error = %e, "Failed to publish realtime event");
        }
    }

    // === Services ===

    pub fn jwt_service(&self) -> &JwtService {
        self.jwt_service.as_ref()
    }

    pub fn snowflake_generator(&self) -> &SnowflakeGenerator {
        self.snowflake_generator.as_ref()
    }

    /// Generate a new Snowflake ID
    pub fn generate_id(&self) -> Snowflake {
        self.snowflake_generator.generate()
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("pool", &"PgPool")
            .field("redis_pool", &self.redis_pool)
            .field("worker_id", &self.snowflake_generator.worker_id())
            .finish()
    }
}

/// Builder for [`ServiceContext`]
///
/// The publisher defaults to a Redis [`Publisher`] on the same pool.
#[derive(Default)]
pub struct ServiceContextBuilder {
    pool: Option<PgPool>,
    redis_pool: Option<SharedRedisPool>,
    user_repo: Option<Arc<dyn UserRepository>>,
    channel_repo: Option<Arc<dyn ChannelRepository>>,
    member_repo: Option<Arc<dyn MemberRepository>>,
    invite_repo: Option<Arc<dyn InviteRepository>>,
    message_repo: Option<Arc<dyn MessageRepository>>,
    reaction_repo: Option<Arc<dyn ReactionRepository>>,
    task_repo: Option<Arc<dyn TaskRepository>>,
    poll_repo: Option<Arc<dyn PollRepository>>,
    publisher: Option<Arc<dyn EventPublisher>>,
    jwt_service: Option<Arc<JwtService>>,
    snowflake_generator: Option<Arc<SnowflakeGenerator>>,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wire every repository to its PostgreSQL implementation
    pub fn postgres(self, pool: PgPool) -> Self {
        self.user_repo(Arc::new(dipcord_db::PgUserRepository::new(pool.clone())))
            .channel_repo(Arc::new(dipcord_db::PgChannelRepository::new(pool.clone())))
            .member_repo(Arc::new(dipcord_db::PgMemberRepository::new(pool.clone())))
            .invite_repo(Arc::new(dipcord_db::PgInviteRepository::new(pool.clone())))
            .message_repo(Arc::new(dipcord_db::PgMessageRepository::new(pool.clone())))
            .reaction_repo(Arc::new(dipcord_db::PgReactionRepository::new(pool.clone())))
            .task_repo(Arc::new(dipcord_db::PgTaskRepository::new(pool.clone())))
            .poll_repo(Arc::new(dipcord_db::PgPollRepository::new(pool.clone())))
            .pool(pool)
    }

    pub fn pool(mut self, pool: PgPool) -> Self {
        self.pool = Some(pool);
        self
    }

    pub fn redis_pool(mut self, redis_pool: SharedRedisPool) -> Self {
        self.redis_pool = Some(redis_pool);
        self
    }

    pub fn user_repo(mut self, repo: Arc<dyn UserRepository>) -> Self {
        self.user_repo = Some(repo);
        self
    }

    pub fn channel_repo(mut self, repo: Arc<dyn ChannelRepository>) -> Self {
        self.channel_repo = Some(repo);
        self
    }

    pub fn member_repo(mut self, repo: Arc<dyn MemberRepository>) -> Self {
        self.member_repo = Some(repo);
        self
    }

    pub fn invite_repo(mut self, repo: Arc<dyn InviteRepository>) -> Self {
        self.invite_repo = Some(repo);
        self
    }

    pub fn message_repo(mut self, repo: Arc<dyn MessageRepository>) -> Self {
        self.message_repo = Some(repo);
        self
    }

    pub fn reaction_repo(mut self, repo: Arc<dyn ReactionRepository>) -> Self {
        self.reaction_repo = Some(repo);
        self
    }

    pub fn task_repo(mut self, repo: Arc<dyn TaskRepository>) -> Self {
        self.task_repo = Some(repo);
        self
    }

    pub fn poll_repo(mut self, repo: Arc<dyn PollRepository>) -> Self {
        self.poll_repo = Some(repo);
        self
    }

    pub fn publisher(mut self, publisher: Arc<dyn EventPublisher>) -> Self {
        self.publisher = Some(publisher);
        self
    }

    pub fn jwt_service(mut self, service: Arc<JwtService>) -> Self {
        self.jwt_service = Some(service);
        self
    }

    pub fn snowflake_generator(mut self, generator: Arc<SnowflakeGenerator>) -> Self {
        self.snowflake_generator = Some(generator);
        self
    }

    /// # Errors
    /// Returns `ServiceError::Validation` if any required dependency is missing
    pub fn build(self) -> ServiceResult<ServiceContext> {
        let redis_pool = required(self.redis_pool, "redis_pool")?;
        let publisher = self
            .publisher
            .unwrap_or_else(|| Arc::new(Publisher::new((*redis_pool).clone())));

        Ok(ServiceContext {
            pool: required(self.pool, "pool")?,
            refresh_token_store: RefreshTokenStore::new((*redis_pool).clone()),
            redis_pool,
            user_repo: required(self.user_repo, "user_repo")?,
            channel_repo: required(self.channel_repo, "channel_repo")?,
            member_repo: required(self.member_repo, "member_repo")?,
            invite_repo: required(self.invite_repo, "invite_repo")?,
            message_repo: required(self.message_repo, "message_repo")?,
            reaction_repo: required(self.reaction_repo, "reaction_repo")?,
            task_repo: required(self.task_repo, "task_repo")?,
            poll_repo: required(self.poll_repo, "poll_repo")?,
            publisher,
            jwt_service: required(self.jwt_service, "jwt_service")?,
            snowflake_generator: required(self.snowflake_generator, "snowflake_generator")?,
        })
    }
}

fn required<T>(value: Option<T>, name: &str) -> ServiceResult<T> {
    value.ok_or_else(|| ServiceError::validation(format!("{name} is required")))
}

//! User service
//!
//! Handles user profile operations.

use dipcord_core::{DomainError, Snowflake, User};
use tracing::{info, instrument};

use crate::dto::{CurrentUserResponse, UpdateUserRequest, UserResponse};

use super::context::ServiceContext;
use super::error::ServiceResult;

/// Upper bound for batch lookups
const MAX_BATCH: usize = 100;

/// User service
pub struct UserService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> UserService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Public profile
    #[instrument(skip(self))]
    pub async fn get_user(&self, user_id: Snowflake) -> ServiceResult<UserResponse> {
        let user = self.get_user_entity(user_id).await?;
        Ok(UserResponse::from(&user))
    }

    /// Public profiles for a set of ids; unknown ids are skipped
    #[instrument(skip(self, user_ids), fields(count = user_ids.len()))]
    pub async fn get_users(&self, user_ids: &[Snowflake]) -> ServiceResult<Vec<UserResponse>> {
        let mut ids = user_ids.to_vec();
        ids.sort_unstable();
        ids.dedup();
        ids.truncate(MAX_BATCH);

        let users = self.ctx.user_repo().find_many(&ids).await?;
        Ok(users.iter().map(UserResponse::from).collect())
    }

    /// The authenticated user's own profile
    #[instrument(skip(self))]
    pub async fn get_current_user(&self, user_id: Snowflake) -> ServiceResult<CurrentUserResponse> {
        let user = self.get_user_entity(user_id).await?;
        Ok(CurrentUserResponse::from(&user))
    }

    #[instrument(skip(self))]
    pub async fn get_user_entity(&self, user_id: Snowflake) -> ServiceResult<User> {
        Ok(self
            .ctx
            .user_repo()
            .find_by_id(user_id)
            .await?
            .ok_or(DomainError::UserNotFound(user_id))?)
    }

    /// Change name and surname
    #[instrument(skip(self, request))]
    pub async fn update_current_user(
        &self,
        user_id: Snowflake,
        request: UpdateUserRequest,
    ) -> ServiceResult<CurrentUserResponse> {
        let mut user = self.get_user_entity(user_id).await?;

        if request.name.is_none() && request.surname.is_none() {
            return Ok(CurrentUserResponse::from(&user));
        }

        user.set_name(
            request.name.map(|n| n.trim().to_string()),
            request.surname.map(|s| s.trim().to_string()),
        );
        self.ctx.user_repo().update(&user).await?;

        info!(user_id = %user_id, "User profile updated");

        Ok(CurrentUserResponse::from(&user))
    }
}

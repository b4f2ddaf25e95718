//! Authentication service
//!
//! Handles user registration, login, token refresh, and logout.
//! Every issued refresh token is tracked in Redis under its `jti`; a refresh
//! swaps the old `jti` for a new one, so a refresh token works exactly once.

use dipcord_common::{hash_password, validate_password_strength, AppError, PasswordService};
use dipcord_core::{DomainError, Snowflake, User};
use tracing::{info, instrument, warn};

use crate::dto::{AuthResponse, CurrentUserResponse, LoginRequest, RegisterRequest};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Authentication service
pub struct AuthService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> AuthService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Register a new user
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn register(&self, request: RegisterRequest) -> ServiceResult<AuthResponse> {
        validate_password_strength(&request.password)?;

        let email = normalize_email(&request.email);
        if self.ctx.user_repo().email_exists(&email).await? {
            return Err(DomainError::EmailAlreadyExists.into());
        }

        let password_hash = hash_password(&request.password)?;

        let user = User::new(
            self.ctx.generate_id(),
            request.name.trim().to_string(),
            request.surname.trim().to_string(),
            email,
        );

        // A concurrent registration can still win the unique index; the
        // repository maps that to EmailAlreadyExists as well
        self.ctx.user_repo().create(&user, &password_hash).await?;

        info!(user_id = %user.id, "User registered");

        self.issue_tokens(&user).await
    }

    /// Login with email and password
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn login(&self, request: LoginRequest) -> ServiceResult<AuthResponse> {
        let email = normalize_email(&request.email);

        let user = self
            .ctx
            .user_repo()
            .find_by_email(&email)
            .await?
            .ok_or_else(|| {
                warn!("Login failed: unknown email");
                ServiceError::App(AppError::InvalidCredentials)
            })?;

        let password_hash = self
            .ctx
            .user_repo()
            .get_password_hash(user.id)
            .await?
            .ok_or(ServiceError::App(AppError::InvalidCredentials))?;

        if let Err(e) = PasswordService::new().verify_or_error(&request.password, &password_hash) {
            warn!(user_id = %user.id, "Login failed: invalid password");
            return Err(e.into());
        }

        info!(user_id = %user.id, "User logged in");

        self.issue_tokens(&user).await
    }

    /// Exchange a refresh token for a new pair
    #[instrument(skip(self, refresh_token))]
    pub async fn refresh(&self, refresh_token: &str) -> ServiceResult<AuthResponse> {
        let claims = self.ctx.jwt_service().validate_refresh_token(refresh_token)?;
        let user_id = claims.user_id()?;

        let user = self
            .ctx
            .user_repo()
            .find_by_id(user_id)
            .await?
            .ok_or(ServiceError::App(AppError::InvalidToken))?;

        let issued = self.ctx.jwt_service().generate_token_pair(user.id)?;

        let rotated = self
            .ctx
            .refresh_token_store()
            .rotate(
                &claims.jti,
                &issued.refresh_claims.jti,
                user.id,
                issued.refresh_claims.remaining_secs(),
            )
            .await?;

        if !rotated {
            warn!(user_id = %user.id, "Refresh token reuse or revoked token");
            return Err(AppError::InvalidToken.into());
        }

        info!(user_id = %user.id, "Tokens refreshed");

        Ok(AuthResponse {
            access_token: issued.pair.access_token,
            refresh_token: issued.pair.refresh_token,
            token_type: issued.pair.token_type,
            expires_in: issued.pair.expires_in,
            user: CurrentUserResponse::from(&user),
        })
    }

    /// Revoke every refresh token of the user
    #[instrument(skip(self))]
    pub async fn logout(&self, user_id: Snowflake) -> ServiceResult<()> {
        let revoked = self
            .ctx
            .refresh_token_store()
            .revoke_all_for_user(user_id)
            .await?;

        info!(user_id = %user_id, revoked, "User logged out");
        Ok(())
    }

    async fn issue_tokens(&self, user: &User) -> ServiceResult<AuthResponse> {
        let issued = self.ctx.jwt_service().generate_token_pair(user.id)?;

        self.ctx
            .refresh_token_store()
            .store(
                &issued.refresh_claims.jti,
                user.id,
                issued.refresh_claims.remaining_secs(),
            )
            .await?;

        Ok(AuthResponse {
            access_token: issued.pair.access_token,
            refresh_token: issued.pair.refresh_token,
            token_type: issued.pair.token_type,
            expires_in: issued.pair.expires_in,
            user: CurrentUserResponse::from(user),
        })
    }
}

/// Emails are stored and compared in lowercase
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::services::test_support::TestHarness;

    fn register_request(email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            name: "Ada".to_string(),
            surname: "Lovelace".to_string(),
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    fn login_request(email: &str, password: &str) -> LoginRequest {
        LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Ada@Example.COM "), "ada@example.com");
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let h = TestHarness::new();
        h.user("Ada");

        let err = AuthService::new(&h.ctx)
            .register(register_request(" ADA@example.com", "correct-horse-1"))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 409);
        assert_eq!(err.error_code(), "EMAIL_ALREADY_EXISTS");
    }

    #[tokio::test]
    async fn test_register_weak_password() {
        let h = TestHarness::new();
        let service = AuthService::new(&h.ctx);

        for password in ["short1", "no-digits-here", "1234567890"] {
            let err = service
                .register(register_request("new@example.com", password))
                .await
                .unwrap_err();
            assert_eq!(err.status_code(), 400, "{password}");
        }
        assert!(!h.ctx.user_repo().email_exists("new@example.com").await.unwrap());
    }

    #[tokio::test]
    async fn test_login_rejects_bad_credentials() {
        let h = TestHarness::new();
        let user = User::new(
            Snowflake::new(7),
            "Grace".to_string(),
            "Hopper".to_string(),
            "grace@example.com".to_string(),
        );
        let hash = hash_password("cobol-1959").unwrap();
        h.ctx.user_repo().create(&user, &hash).await.unwrap();

        let service = AuthService::new(&h.ctx);

        let err = service
            .login(login_request("grace@example.com", "fortran-1957"))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 401);
        assert_eq!(err.error_code(), "INVALID_CREDENTIALS");

        let err = service
            .login(login_request("nobody@example.com", "cobol-1959"))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 401);
        assert_eq!(err.error_code(), "INVALID_CREDENTIALS");
    }
}

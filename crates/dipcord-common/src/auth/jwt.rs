//! JWT issuing and validation (HS256)
//!
//! Access and refresh tokens share one claim shape and are told apart by
//! `token_type`. Every token gets a random `jti`; for refresh tokens it is the
//! key under which the token is tracked server-side so it can be rotated and
//! revoked.

use chrono::{Duration, Utc};
use dipcord_core::Snowflake;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    Access,
    Refresh,
}

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
    /// Unique token id
    pub jti: String,
    pub token_type: TokenType,
}

impl Claims {
    /// # Errors
    /// Returns `InvalidToken` if the subject is not a snowflake
    pub fn user_id(&self) -> Result<Snowflake, AppError> {
        Snowflake::parse(&self.sub).map_err(|_| AppError::InvalidToken)
    }

    #[must_use]
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }

    /// Seconds until expiry, never negative
    #[must_use]
    pub fn remaining_secs(&self) -> u64 {
        u64::try_from(self.exp - Utc::now().timestamp()).unwrap_or(0)
    }
}

/// Token pair returned to clients
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    /// Access token lifetime in seconds
    pub expires_in: i64,
}

/// A freshly minted pair together with the refresh token's claims
#[derive(Debug, Clone)]
pub struct IssuedTokens {
    pub pair: TokenPair,
    pub refresh_claims: Claims,
}

/// JWT service for encoding and decoding tokens
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_token_expiry: i64,
    refresh_token_expiry: i64,
}

impl JwtService {
    #[must_use]
    pub fn new(secret: &str, access_token_expiry: i64, refresh_token_expiry: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            access_token_expiry,
            refresh_token_expiry,
        }
    }

    #[must_use]
    pub fn refresh_token_expiry(&self) -> i64 {
        self.refresh_token_expiry
    }

    /// Mint a new access/refresh pair
    ///
    /// # Errors
    /// Returns an error if token encoding fails
    pub fn generate_token_pair(&self, user_id: Snowflake) -> Result<IssuedTokens, AppError> {
        let (access_token, _) = self.encode_token(user_id, TokenType::Access)?;
        let (refresh_token, refresh_claims) = self.encode_token(user_id, TokenType::Refresh)?;

        Ok(IssuedTokens {
            pair: TokenPair {
                access_token,
                refresh_token,
                token_type: "Bearer".to_string(),
                expires_in: self.access_token_expiry,
            },
            refresh_claims,
        })
    }

    fn encode_token(
        &self,
        user_id: Snowflake,
        token_type: TokenType,
    ) -> Result<(String, Claims), AppError> {
        let now = Utc::now();
        let expiry = match token_type {
            TokenType::Access => self.access_token_expiry,
            TokenType::Refresh => self.refresh_token_expiry,
        };

        let claims = Claims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(expiry)).timestamp(),
            jti: Uuid::new_v4().to_string(),
            token_type,
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to encode JWT: {e}")))?;
        Ok((token, claims))
    }

    /// Decode and validate signature and expiry
    ///
    /// # Errors
    /// Returns `TokenExpired` or `InvalidToken`
    pub fn decode_token(&self, token: &str) -> Result<Claims, AppError> {
        let validation = Validation::default();

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AppError::TokenExpired,
                _ => AppError::InvalidToken,
            })
    }

    /// # Errors
    /// Fails if the token is invalid, expired, or a refresh token
    pub fn validate_access_token(&self, token: &str) -> Result<Claims, AppError> {
        let claims = self.decode_token(token)?;
        if claims.token_type != TokenType::Access {
            return Err(AppError::InvalidToken);
        }
        Ok(claims)
    }

    /// # Errors
    /// Fails if the token is invalid, expired, or an access token
    pub fn validate_refresh_token(&self, token: &str) -> Result<Claims, AppError> {
        let claims = self.decode_token(token)?;
        if claims.token_type != TokenType::Refresh {
            return Err(AppError::InvalidToken);
        }
        Ok(claims)
    }
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("access_token_expiry", &self.access_token_expiry)
            .field("refresh_token_expiry", &self.refresh_token_expiry)
            .finish_non_exhaustive()
    }
}

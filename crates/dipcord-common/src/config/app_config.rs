//! Application configuration structs
//!
//! Everything is read from environment variables (a `.env` file is loaded first
//! when present). Only `DATABASE_URL` and `JWT_SECRET` are mandatory.

use serde::Deserialize;
use std::env;
use std::str::FromStr;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub api: ServerConfig,
    pub gateway: GatewayConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub jwt: JwtConfig,
    pub rate_limit: RateLimitConfig,
    pub cors: CorsConfig,
    pub snowflake: SnowflakeConfig,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default)]
    pub env: Environment,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Ok(Self::Production),
            "staging" => Ok(Self::Staging),
            "development" | "dev" => Ok(Self::Development),
            other => Err(format!("unknown environment '{other}'")),
        }
    }
}

/// HTTP server bind address
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// WebSocket gateway settings
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_host")]
    pub host: String,
    pub port: u16,
    #[serde(default = "default_heartbeat_interval")]
    pub heartbeat_interval_ms: u64,
    #[serde(default = "default_heartbeat_timeout")]
    pub heartbeat_timeout_ms: u64,
}

impl GatewayConfig {
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Database configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    /// Apply embedded migrations on startup
    #[serde(default)]
    pub run_migrations: bool,
}

/// Redis configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    #[serde(default = "default_redis_url")]
    pub url: String,
    #[serde(default = "default_redis_max_connections")]
    pub max_connections: u32,
}

/// JWT configuration. Expiries are in seconds.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    #[serde(default = "default_access_token_expiry")]
    pub access_token_expiry: i64,
    #[serde(default = "default_refresh_token_expiry")]
    pub refresh_token_expiry: i64,
}

/// Rate limiting configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: u32,
    #[serde(default = "default_burst")]
    pub burst: u32,
}

/// CORS configuration. An empty list allows any origin.
#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

/// Snowflake ID generator configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SnowflakeConfig {
    #[serde(default)]
    pub worker_id: u16,
}

// Default value functions
fn default_app_name() -> String {
    "dipcord".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_api_port() -> u16 {
    8080
}

fn default_gateway_port() -> u16 {
    8081
}

fn default_heartbeat_interval() -> u64 {
    45_000
}

fn default_heartbeat_timeout() -> u64 {
    90_000
}

fn default_max_connections() -> u32 {
    20
}

fn default_min_connections() -> u32 {
    5
}

fn default_redis_url() -> String {
    "redis://127.0.0.1:6379".to_string()
}

fn default_redis_max_connections() -> u32 {
    10
}

fn default_access_token_expiry() -> i64 {
    900 // 15 minutes
}

fn default_refresh_token_expiry() -> i64 {
    604_800 // 7 days
}

fn default_requests_per_second() -> u32 {
    10
}

fn default_burst() -> u32 {
    50
}

/// Reads one variable through `lookup`, falling back to `default` when unset.
/// A value that is set but does not parse is an error, not a silent default.
fn var_or<T, F>(lookup: &F, key: &'static str, default: impl FnOnce() -> T) -> Result<T, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key, raw)),
        None => Ok(default()),
    }
}

fn required<F>(lookup: &F, key: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigError::MissingVar(key))
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if required environment variables are missing or a
    /// present variable cannot be parsed
    pub fn from_env() -> Result<Self, ConfigError> {
        // A missing .env file is fine
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key/value source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = &lookup;

        let snowflake = SnowflakeConfig {
            worker_id: var_or(lookup, "WORKER_ID", || 0)?,
        };
        if snowflake.worker_id >= 1024 {
            return Err(ConfigError::InvalidValue(
                "WORKER_ID",
                snowflake.worker_id.to_string(),
            ));
        }

        Ok(Self {
            app: AppSettings {
                name: lookup("APP_NAME").unwrap_or_else(default_app_name),
                env: var_or(lookup, "APP_ENV", Environment::default)?,
            },
            api: ServerConfig {
                host: lookup("API_HOST").unwrap_or_else(default_host),
                port: var_or(lookup, "API_PORT", default_api_port)?,
            },
            gateway: GatewayConfig {
                host: lookup("GATEWAY_HOST").unwrap_or_else(default_host),
                port: var_or(lookup, "GATEWAY_PORT", default_gateway_port)?,
                heartbeat_interval_ms: var_or(
                    lookup,
                    "GATEWAY_HEARTBEAT_INTERVAL_MS",
                    default_heartbeat_interval,
                )?,
                heartbeat_timeout_ms: var_or(
                    lookup,
                    "GATEWAY_HEARTBEAT_TIMEOUT_MS",
                    default_heartbeat_timeout,
                )?,
            },
            database: DatabaseConfig {
                url: required(lookup, "DATABASE_URL")?,
                max_connections: var_or(lookup, "DATABASE_MAX_CONNECTIONS", default_max_connections)?,
                min_connections: var_or(lookup, "DATABASE_MIN_CONNECTIONS", default_min_connections)?,
                run_migrations: var_or(lookup, "DATABASE_RUN_MIGRATIONS", || false)?,
            },
            redis: RedisConfig {
                url: lookup("REDIS_URL").unwrap_or_else(default_redis_url),
                max_connections: var_or(
                    lookup,
                    "REDIS_MAX_CONNECTIONS",
                    default_redis_max_connections,
                )?,
            },
            jwt: JwtConfig {
                secret: required(lookup, "JWT_SECRET")?,
                access_token_expiry: var_or(
                    lookup,
                    "JWT_ACCESS_TOKEN_EXPIRY",
                    default_access_token_expiry,
                )?,
                refresh_token_expiry: var_or(
                    lookup,
                    "JWT_REFRESH_TOKEN_EXPIRY",
                    default_refresh_token_expiry,
                )?,
            },
            rate_limit: RateLimitConfig {
                requests_per_second: var_or(
                    lookup,
                    "RATE_LIMIT_REQUESTS_PER_SECOND",
                    default_requests_per_second,
                )?,
                burst: var_or(lookup, "RATE_LIMIT_BURST", default_burst)?,
            },
            cors: CorsConfig {
                allowed_origins: lookup("CORS_ALLOWED_ORIGINS")
                    .map(|s| {
                        s.split(',')
                            .map(str::trim)
                            .filter(|o| !o.is_empty())
                            .map(String::from)
                            .collect()
                    })
                    .unwrap_or_default(),
            },
            snowflake,
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}

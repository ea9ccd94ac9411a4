//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`;
//!   not required when `STOREFRONT_STORE=memory`)
//! - `STOREFRONT_JWT_SECRET` - Token signing secret (min 32 chars, high entropy)
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 5000)
//! - `STOREFRONT_TOKEN_TTL_DAYS` - Token lifetime in days (default: 30)
//! - `STOREFRONT_ENVIRONMENT` - `development` or `production` (default: development)
//! - `STOREFRONT_STATUS_POLICY` - `permissive` or `forward_only` (default: permissive)
//! - `STOREFRONT_RATE_LIMIT` - Enable per-IP rate limiting (default: true)
//! - `STOREFRONT_CORS_ORIGINS` - Comma-separated allowed origins (default: any)
//! - `STOREFRONT_STORE` - `postgres` or `memory` (default: postgres)
//! - `STOREFRONT_LOG_FORMAT` - `text` or `json` (default: text)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use crate::services::orders::StatusPolicy;

const MIN_JWT_SECRET_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;
const DEFAULT_TOKEN_TTL_DAYS: i64 = 30;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Deployment environment.
///
/// Error responses include diagnostic detail everywhere except production.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    /// Whether error responses may carry diagnostic detail.
    #[must_use]
    pub const fn exposes_error_detail(self) -> bool {
        matches!(self, Self::Development)
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            other => Err(format!("expected development or production, got {other:?}")),
        }
    }
}

/// Which store backs the repositories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreKind {
    #[default]
    Postgres,
    Memory,
}

impl FromStr for StoreKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "postgres" => Ok(Self::Postgres),
            "memory" => Ok(Self::Memory),
            other => Err(format!("expected postgres or memory, got {other:?}")),
        }
    }
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: Option<SecretString>,
    /// Backing store
    pub store: StoreKind,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Token signing secret
    pub jwt_secret: SecretString,
    /// How long an issued token stays valid
    pub token_ttl: chrono::Duration,
    /// Deployment environment
    pub environment: Environment,
    /// Which status transitions staff may make
    pub status_policy: StatusPolicy,
    /// Whether per-IP rate limiting is applied
    pub rate_limit: bool,
    /// Allowed CORS origins; empty means any origin
    pub cors_origins: Vec<String>,
    /// Emit JSON log lines instead of human-readable text
    pub json_logs: bool,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment tag
    pub sentry_environment: Option<String>,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let store: StoreKind = parse_env_or_default("STOREFRONT_STORE", "postgres")?;
        let database_url = match store {
            StoreKind::Postgres => Some(get_database_url("STOREFRONT_DATABASE_URL")?),
            StoreKind::Memory => None,
        };
        let host: IpAddr = parse_env_or_default("STOREFRONT_HOST", "127.0.0.1")?;
        let port: u16 = parse_env_or_default("STOREFRONT_PORT", "5000")?;

        let jwt_secret = get_validated_secret("STOREFRONT_JWT_SECRET")?;
        validate_jwt_secret(&jwt_secret, "STOREFRONT_JWT_SECRET")?;

        let ttl_days: i64 = parse_env_or_default(
            "STOREFRONT_TOKEN_TTL_DAYS",
            &DEFAULT_TOKEN_TTL_DAYS.to_string(),
        )?;
        if ttl_days <= 0 {
            return Err(ConfigError::InvalidEnvVar(
                "STOREFRONT_TOKEN_TTL_DAYS".to_string(),
                "must be a positive number of days".to_string(),
            ));
        }

        let environment = parse_env_or_default("STOREFRONT_ENVIRONMENT", "development")?;
        let status_policy = parse_env_or_default("STOREFRONT_STATUS_POLICY", "permissive")?;
        let rate_limit = parse_env_or_default("STOREFRONT_RATE_LIMIT", "true")?;
        let cors_origins = get_optional_env("STOREFRONT_CORS_ORIGINS")
            .map(|raw| parse_origins(&raw))
            .unwrap_or_default();
        let json_logs = get_env_or_default("STOREFRONT_LOG_FORMAT", "text")
            .eq_ignore_ascii_case("json");

        Ok(Self {
            database_url,
            store,
            host,
            port,
            jwt_secret,
            token_ttl: chrono::Duration::days(ttl_days),
            environment,
            status_policy,
            rate_limit,
            cors_origins,
            json_logs,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Configuration for tests and local tooling: in-memory store, no rate
    /// limiting, development error detail.
    #[must_use]
    pub fn for_tests(jwt_secret: SecretString) -> Self {
        Self {
            database_url: None,
            store: StoreKind::Memory,
            host: IpAddr::from([127, 0, 0, 1]),
            port: 5000,
            jwt_secret,
            token_ttl: chrono::Duration::days(DEFAULT_TOKEN_TTL_DAYS),
            environment: Environment::Development,
            status_policy: StatusPolicy::Permissive,
            rate_limit: false,
            cors_origins: Vec::new(),
            json_logs: false,
            sentry_dsn: None,
            sentry_environment: None,
        }
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable, falling back to `default` when unset.
fn parse_env_or_default<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(key, default)
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Split a comma-separated origin list, dropping blanks.
fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Validate that a signing secret meets minimum length requirements.
fn validate_jwt_secret(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_JWT_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_JWT_SECRET_LENGTH,
                value.len()
            ),
        ));
    }
    Ok(())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)]
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

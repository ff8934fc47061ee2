//! Server configuration loaded from the environment.
//!
//! Environment variables:
//!   DATABASE_URL              - PostgreSQL connection string
//!   HOST / PORT               - bind address (default 0.0.0.0:5200)
//!   SESSION_SECRET            - token signing key, at least 32 bytes (required)
//!   ALLOWED_ORIGINS           - comma-separated CORS allow-list
//!   COOKIE_SECURE             - add `Secure` to the session cookie
//!   PIN_SCOPE                 - "any" (default) or "owner"
//!   PASSWORD_HASH_MEMORY_KIB  - Argon2id memory cost
//!   PASSWORD_HASH_ITERATIONS  - Argon2id iteration count
//!   DB_MAX_CONNECTIONS        - pool ceiling (default 10)
//!   DB_MIN_CONNECTIONS        - connections kept open while idle (default 1)
//!   DB_ACQUIRE_TIMEOUT_SECS   - wait for a free connection (default 30)
//!   DB_IDLE_TIMEOUT_SECS      - close surplus idle connections after (default 600)

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use jotter_core::defaults;
use jotter_db::PoolConfig;

use crate::auth::password::PasswordParams;
use crate::services::PinScope;

/// Errors raised while reading configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{key} has invalid value {value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Fully resolved server configuration.
#[derive(Clone)]
pub struct ApiConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub session_secret: String,
    pub allowed_origins: Vec<String>,
    pub cookie_secure: bool,
    pub pin_scope: PinScope,
    pub password: PasswordParams,
    pub pool: PoolConfig,
    pub body_limit_bytes: usize,
}

impl fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("session_secret", &"[REDACTED]")
            .field("allowed_origins", &self.allowed_origins)
            .field("cookie_secure", &self.cookie_secure)
            .field("pin_scope", &self.pin_scope)
            .field("password", &self.password)
            .field("pool", &self.pool)
            .finish()
    }
}

impl ApiConfig {
    /// Read configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let session_secret =
            get("SESSION_SECRET").ok_or(ConfigError::Missing("SESSION_SECRET"))?;
        if session_secret.len() < defaults::SESSION_SECRET_MIN_LEN {
            return Err(ConfigError::Invalid {
                key: "SESSION_SECRET",
                value: "[REDACTED]".to_string(),
                reason: format!(
                    "must be at least {} bytes",
                    defaults::SESSION_SECRET_MIN_LEN
                ),
            });
        }

        let allowed_origins = parse_origins(
            &get("ALLOWED_ORIGINS").unwrap_or_else(|| defaults::ALLOWED_ORIGINS.to_string()),
        );

        let password = PasswordParams {
            memory_kib: parse_or(
                "PASSWORD_HASH_MEMORY_KIB",
                get("PASSWORD_HASH_MEMORY_KIB"),
                defaults::PASSWORD_HASH_MEMORY_KIB,
            )?,
            iterations: parse_or(
                "PASSWORD_HASH_ITERATIONS",
                get("PASSWORD_HASH_ITERATIONS"),
                defaults::PASSWORD_HASH_ITERATIONS,
            )?,
            parallelism: defaults::PASSWORD_HASH_PARALLELISM,
        };
        if password.memory_kib < 8 * password.parallelism || password.iterations == 0 {
            return Err(ConfigError::Invalid {
                key: "PASSWORD_HASH_MEMORY_KIB",
                value: format!("{}/{}", password.memory_kib, password.iterations),
                reason: "memory must be at least 8 KiB per lane and iterations at least 1"
                    .to_string(),
            });
        }

        let pool = PoolConfig {
            max_connections: parse_or(
                "DB_MAX_CONNECTIONS",
                get("DB_MAX_CONNECTIONS"),
                defaults::DB_MAX_CONNECTIONS,
            )?,
            min_connections: parse_or(
                "DB_MIN_CONNECTIONS",
                get("DB_MIN_CONNECTIONS"),
                defaults::DB_MIN_CONNECTIONS,
            )?,
            acquire_timeout: Duration::from_secs(parse_or(
                "DB_ACQUIRE_TIMEOUT_SECS",
                get("DB_ACQUIRE_TIMEOUT_SECS"),
                defaults::DB_ACQUIRE_TIMEOUT_SECS,
            )?),
            idle_timeout: Duration::from_secs(parse_or(
                "DB_IDLE_TIMEOUT_SECS",
                get("DB_IDLE_TIMEOUT_SECS"),
                defaults::DB_IDLE_TIMEOUT_SECS,
            )?),
        };
        pool.validate().map_err(|e| ConfigError::Invalid {
            key: "DB_MIN_CONNECTIONS",
            value: format!(
                "{}..{} / {}s",
                pool.min_connections,
                pool.max_connections,
                pool.acquire_timeout.as_secs()
            ),
            reason: e.to_string(),
        })?;

        Ok(Self {
            database_url: get("DATABASE_URL").unwrap_or_else(|| defaults::DATABASE_URL.to_string()),
            host: get("HOST").unwrap_or_else(|| defaults::HOST.to_string()),
            port: parse_or("PORT", get("PORT"), defaults::PORT)?,
            session_secret,
            allowed_origins,
            cookie_secure: parse_bool("COOKIE_SECURE", get("COOKIE_SECURE"))?,
            pin_scope: parse_or("PIN_SCOPE", get("PIN_SCOPE"), PinScope::Any)?,
            password,
            pool,
            body_limit_bytes: defaults::BODY_LIMIT_BYTES,
        })
    }

    /// Socket address string to bind.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T>(key: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            reason: e.to_string(),
            value,
        }),
    }
}

fn parse_bool(key: &'static str, raw: Option<String>) -> Result<bool, ConfigError> {
    match raw.as_deref().map(|v| v.trim().to_ascii_lowercase()) {
        None => Ok(false),
        Some(v) if v == "true" || v == "1" => Ok(true),
        Some(v) if v == "false" || v == "0" => Ok(false),
        Some(v) => Err(ConfigError::Invalid {
            key,
            value: v,
            reason: "expected true/false".to_string(),
        }),
    }
}

/// Split a comma-separated origin list, dropping blanks.
pub fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

//! Postgres pool setup for the jotter stores.

use std::time::{Duration, Instant};

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

use jotter_core::defaults;
use jotter_core::{Error, Result};

/// Sizing and timeouts for the store pool.
///
/// The server fills this from `DB_*` environment variables; tests use the
/// defaults with a smaller ceiling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolConfig {
    pub max_connections: u32,
    pub min_connections: u32,
    /// How long a store call waits for a free connection.
    pub acquire_timeout: Duration,
    /// Idle connections above `min_connections` close after this.
    pub idle_timeout: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: defaults::DB_MAX_CONNECTIONS,
            min_connections: defaults::DB_MIN_CONNECTIONS,
            acquire_timeout: Duration::from_secs(defaults::DB_ACQUIRE_TIMEOUT_SECS),
            idle_timeout: Duration::from_secs(defaults::DB_IDLE_TIMEOUT_SECS),
        }
    }
}

impl PoolConfig {
    /// Reject settings the pool would accept but could never serve with.
    pub fn validate(&self) -> Result<()> {
        if self.max_connections == 0 {
            return Err(Error::Config(
                "pool needs at least one connection".to_string(),
            ));
        }
        if self.min_connections > self.max_connections {
            return Err(Error::Config(format!(
                "min connections ({}) exceeds max connections ({})",
                self.min_connections, self.max_connections
            )));
        }
        if self.acquire_timeout.is_zero() {
            return Err(Error::Config(
                "acquire timeout must be positive".to_string(),
            ));
        }
        Ok(())
    }

    fn options(&self) -> PgPoolOptions {
        PgPoolOptions::new()
            .max_connections(self.max_connections)
            .min_connections(self.min_connections)
            .acquire_timeout(self.acquire_timeout)
            .idle_timeout(self.idle_timeout)
    }
}

/// Validate `config` and open a pool against `database_url`.
pub async fn connect_pool(database_url: &str, config: &PoolConfig) -> Result<PgPool> {
    config.validate()?;
    let start = Instant::now();

    let pool = config
        .options()
        .connect(database_url)
        .await
        .map_err(Error::Database)?;

    info!(
        subsystem = "db",
        component = "pool",
        op = "connect",
        max_connections = config.max_connections,
        min_connections = config.min_connections,
        acquire_timeout_secs = config.acquire_timeout.as_secs(),
        open = pool.size(),
        duration_ms = start.elapsed().as_millis() as u64,
        "Store pool ready"
    );
    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_come_from_core() {
        let config = PoolConfig::default();
        assert_eq!(config.max_connections, defaults::DB_MAX_CONNECTIONS);
        assert_eq!(config.min_connections, defaults::DB_MIN_CONNECTIONS);
        assert_eq!(
            config.acquire_timeout,
            Duration::from_secs(defaults::DB_ACQUIRE_TIMEOUT_SECS)
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_unusable_sizing() {
        let empty = PoolConfig {
            max_connections: 0,
            min_connections: 0,
            ..PoolConfig::default()
        };
        assert!(matches!(empty.validate(), Err(Error::Config(_))));

        let inverted = PoolConfig {
            max_connections: 2,
            min_connections: 5,
            ..PoolConfig::default()
        };
        match inverted.validate() {
            Err(Error::Config(msg)) => assert!(msg.contains("exceeds")),
            other => panic!("expected Config error, got {:?}", other),
        }

        let no_wait = PoolConfig {
            acquire_timeout: Duration::ZERO,
            ..PoolConfig::default()
        };
        assert!(no_wait.validate().is_err());
    }

    #[tokio::test]
    async fn test_connect_validates_before_dialing() {
        let config = PoolConfig {
            max_connections: 0,
            ..PoolConfig::default()
        };
        // Never reaches the network: the unroutable URL would otherwise fail
        // with a Database error.
        let err = connect_pool("postgres://nobody@127.0.0.1:1/none", &config)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}

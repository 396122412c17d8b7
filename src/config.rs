//! Environment-driven runtime configuration.

use std::net::SocketAddr;
use thiserror::Error;

/// Environment variable holding the listen address.
pub const BIND_ADDR_VAR: &str = "TASKBOARD_BIND_ADDR";
/// Environment variable holding the `PostgreSQL` connection URL.
pub const DATABASE_URL_VAR: &str = "DATABASE_URL";
/// Environment variable holding the connection pool size.
pub const POOL_SIZE_VAR: &str = "TASKBOARD_DB_POOL_SIZE";
/// Environment variable holding the log filter directives.
pub const LOG_FILTER_VAR: &str = "RUST_LOG";

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8000";
const DEFAULT_POOL_SIZE: u32 = 10;
const DEFAULT_LOG_FILTER: &str = "taskboard=debug,tower_http=info";

/// Errors raised while reading configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable holds a value that cannot be parsed.
    #[error("invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        /// Name of the offending variable.
        key: &'static str,
        /// Raw value as found.
        value: String,
        /// Why the value was rejected.
        reason: String,
    },
}

/// Runtime configuration for the server binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    bind_addr: SocketAddr,
    database_url: Option<String>,
    pool_size: u32,
    log_filter: String,
}

impl AppConfig {
    /// Reads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] when a variable is set to an
    /// unparsable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`, which maps variable names to
    /// values.
    ///
    /// Blank values count as unset.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] when a variable is set to an
    /// unparsable value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let bind_addr = read(BIND_ADDR_VAR)
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_owned())
            .trim()
            .parse::<SocketAddr>()
            .map_err(|err| invalid(BIND_ADDR_VAR, read(BIND_ADDR_VAR), &err))?;

        let pool_size = match read(POOL_SIZE_VAR) {
            None => DEFAULT_POOL_SIZE,
            Some(raw) => match raw.trim().parse::<u32>() {
                Ok(0) => return Err(invalid(POOL_SIZE_VAR, Some(raw), &"must be positive")),
                Ok(size) => size,
                Err(err) => return Err(invalid(POOL_SIZE_VAR, Some(raw), &err)),
            },
        };

        Ok(Self {
            bind_addr,
            database_url: read(DATABASE_URL_VAR),
            pool_size,
            log_filter: read(LOG_FILTER_VAR).unwrap_or_else(|| DEFAULT_LOG_FILTER.to_owned()),
        })
    }

    /// Returns the listen address.
    #[must_use]
    pub const fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }

    /// Returns the `PostgreSQL` URL; `None` selects the in-memory store.
    #[must_use]
    pub fn database_url(&self) -> Option<&str> {
        self.database_url.as_deref()
    }

    /// Returns the maximum number of pooled database connections.
    #[must_use]
    pub const fn pool_size(&self) -> u32 {
        self.pool_size
    }

    /// Returns the log filter directives.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }
}

fn invalid(
    key: &'static str,
    value: Option<String>,
    reason: &dyn std::fmt::Display,
) -> ConfigError {
    ConfigError::InvalidValue {
        key,
        value: value.unwrap_or_default(),
        reason: reason.to_string(),
    }
}

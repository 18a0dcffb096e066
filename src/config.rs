//! Environment-driven configuration for the registry store.

use std::env;
use thiserror::Error;

/// Environment variable holding the `PostgreSQL` connection URL.
pub const DATABASE_URL_VAR: &str = "DATABASE_URL";
/// Environment variable holding the connection pool size.
pub const POOL_SIZE_VAR: &str = "MLREGISTRY_POOL_SIZE";
/// Pool size used when [`POOL_SIZE_VAR`] is unset.
pub const DEFAULT_POOL_SIZE: u32 = 8;

/// Errors returned while loading configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required variable is unset or blank.
    #[error("environment variable {0} is required")]
    Missing(&'static str),

    /// A variable holds a value that cannot be used.
    #[error("environment variable {name} has invalid value '{value}'")]
    Invalid {
        /// Variable name.
        name: &'static str,
        /// Rejected value.
        value: String,
    },
}

/// Connection settings for the `PostgreSQL` registry store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryConfig {
    database_url: String,
    pool_size: u32,
}

impl RegistryConfig {
    /// Creates configuration with the default pool size.
    #[must_use]
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            pool_size: DEFAULT_POOL_SIZE,
        }
    }

    /// Overrides the pool size.
    #[must_use]
    pub const fn with_pool_size(mut self, pool_size: u32) -> Self {
        self.pool_size = pool_size;
        self
    }

    /// Loads `.env` if present, then reads configuration from the process
    /// environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] when `DATABASE_URL` is unset, or
    /// [`ConfigError::Invalid`] when the pool size is not a positive integer.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Reads configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// See [`RegistryConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = lookup(DATABASE_URL_VAR)
            .filter(|value| !value.trim().is_empty())
            .ok_or(ConfigError::Missing(DATABASE_URL_VAR))?;

        let pool_size = match lookup(POOL_SIZE_VAR) {
            None => DEFAULT_POOL_SIZE,
            Some(raw) => match raw.trim().parse::<u32>() {
                Ok(size) if size > 0 => size,
                _ => {
                    return Err(ConfigError::Invalid {
                        name: POOL_SIZE_VAR,
                        value: raw,
                    });
                }
            },
        };

        Ok(Self {
            database_url,
            pool_size,
        })
    }

    /// Returns the `PostgreSQL` connection URL.
    #[must_use]
    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    /// Returns the maximum number of pooled connections.
    #[must_use]
    pub const fn pool_size(&self) -> u32 {
        self.pool_size
    }
}

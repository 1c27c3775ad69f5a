//! Process-wide configuration, sourced from the environment at startup.
//!
//! Recognized variables and their defaults:
//! - `PG_HOST` (`127.0.0.1`), `PG_PORT` (`5432`), `PG_USER` (`postgres`),
//!   `PG_PASSWORD` (empty), `PG_DATABASE` (`books`)
//! - `DB_MAX_CONNECTIONS` (`5`), `DB_ACQUIRE_TIMEOUT_SECS` (`5`)
//! - `SERVER_HOST` (`127.0.0.1`), `SERVER_PORT` (`8080`)

use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
}

/// Connection settings for the relational store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub database: String,
    /// Upper bound on concurrently held connections.
    pub max_connections: u32,
    /// How long a caller waits for a free connection (and how long the
    /// startup liveness probe may take) before the operation fails.
    pub acquire_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl AppConfig {
    /// Loads configuration from the environment, falling back to the
    /// documented defaults for anything unset.
    pub fn from_env() -> Self {
        Self {
            database: DatabaseConfig {
                host: env::var("PG_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
                port: env::var("PG_PORT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(5432),
                username: env::var("PG_USER").unwrap_or_else(|_| "postgres".to_string()),
                password: env::var("PG_PASSWORD").unwrap_or_default(),
                database: env::var("PG_DATABASE").unwrap_or_else(|_| "books".to_string()),
                max_connections: env::var("DB_MAX_CONNECTIONS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(5),
                acquire_timeout_secs: env::var("DB_ACQUIRE_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(5),
            },
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
                port: env::var("SERVER_PORT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(8080),
            },
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.host.is_empty() {
            return Err(ConfigError::InvalidDatabaseConfig(
                "database host cannot be empty".to_string(),
            ));
        }
        if self.database.database.is_empty() {
            return Err(ConfigError::InvalidDatabaseConfig(
                "database name cannot be empty".to_string(),
            ));
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::InvalidDatabaseConfig(
                "max connections must be greater than 0".to_string(),
            ));
        }
        if self.database.acquire_timeout_secs == 0 {
            return Err(ConfigError::InvalidDatabaseConfig(
                "acquire timeout must be greater than 0".to_string(),
            ));
        }
        if self.server.port == 0 {
            return Err(ConfigError::InvalidServerConfig(
                "server port cannot be 0".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid database configuration: {0}")]
    InvalidDatabaseConfig(String),
    #[error("invalid server configuration: {0}")]
    InvalidServerConfig(String),
    #[error("environment variable error: {0}")]
    EnvVarError(#[from] std::env::VarError),
}

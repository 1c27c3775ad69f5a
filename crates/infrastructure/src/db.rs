//! Connection pool lifecycle.
//!
//! The pool is an explicitly owned handle: created once at startup, handed
//! to repositories as cheap clones, closed once at shutdown. sqlx evicts
//! broken idle connections on its own and replaces them on the next
//! acquisition, so a dead idle connection never takes the process down.

use std::time::Duration;

use config::DatabaseConfig;
use domain::{RepositoryError, RepositoryResult};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;

#[derive(Clone, Debug)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Opens the pool and runs a liveness probe against the store. Fails
    /// with `Connectivity` if the store cannot be reached within the
    /// configured acquire timeout, so the service never reports itself
    /// healthy while storage is down.
    pub async fn connect(config: &DatabaseConfig) -> RepositoryResult<Self> {
        let options = PgConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.username)
            .password(&config.password)
            .database(&config.database);

        let acquire_timeout = Duration::from_secs(config.acquire_timeout_secs);
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(acquire_timeout)
            .connect_with(options)
            .await
            .map_err(|err| RepositoryError::connectivity(err.to_string()))?;

        let probe = sqlx::query("SELECT 1").execute(&pool);
        match tokio::time::timeout(acquire_timeout, probe).await {
            Ok(Ok(_)) => {}
            Ok(Err(err)) => {
                pool.close().await;
                return Err(RepositoryError::connectivity(err.to_string()));
            }
            Err(_) => {
                pool.close().await;
                return Err(RepositoryError::connectivity(format!(
                    "liveness probe timed out after {}s",
                    config.acquire_timeout_secs
                )));
            }
        }

        tracing::info!(
            host = %config.host,
            port = config.port,
            database = %config.database,
            max_connections = config.max_connections,
            "connected to postgres"
        );
        Ok(Self { pool })
    }

    /// Clone handle for repositories; `PgPool` is internally reference
    /// counted.
    pub fn pool(&self) -> PgPool {
        self.pool.clone()
    }

    /// Waits for in-flight operations to release their connections, then
    /// closes the pool. Idempotent; safe to call after a failed `connect`.
    pub async fn shutdown(&self) {
        self.pool.close().await;
        tracing::info!("database pool closed");
    }
}

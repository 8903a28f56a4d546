//! SQLite connection handling.

use crate::error::{Result, ServerError};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use tracing::info;

/// Wraps the connection pool and owns schema migration.
#[derive(Clone, Debug)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Connect to the given SQLite URL, creating the file and applying
    /// pending migrations as needed.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| ServerError::Database(format!("invalid database URL: {e}")))?
            .create_if_missing(true);

        // An in-memory database lives and dies with its connection, so it
        // must be served by exactly one connection that never recycles.
        let pool_options = if database_url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(|e| ServerError::Database(format!("failed to connect: {e}")))?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| ServerError::Database(format!("migration failed: {e}")))?;

        info!(url = %database_url, "database ready");
        Ok(Self { pool })
    }

    /// The underlying pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

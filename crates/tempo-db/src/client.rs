//! Database client and connection management

use crate::DbResult;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;

/// Database client wrapping an sqlx connection pool.
///
/// Cheap to clone; every operation checks out its own pooled connection,
/// so a fault in one poll cycle cannot leak into the next.
#[derive(Clone)]
pub struct DbClient {
    pool: SqlitePool,
}

impl DbClient {
    /// Create a new database client from a connection string
    /// (e.g. `sqlite:weather.db?mode=rwc`)
    pub async fn new(database_url: &str) -> DbResult<Self> {
        let opts = SqliteConnectOptions::from_str(database_url)
            .map_err(crate::DbError::ConnectionError)?
            .create_if_missing(true);

        Self::with_options(opts).await
    }

    /// Create a new database client with custom options
    pub async fn with_options(opts: SqliteConnectOptions) -> DbResult<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(10)
            .acquire_timeout(Duration::from_secs(30))
            .connect_with(opts)
            .await?;

        Ok(Self { pool })
    }

    /// Get reference to underlying pool for direct queries
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Test the database connection
    pub async fn ping(&self) -> DbResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Close the connection pool gracefully
    pub async fn close(self) {
        self.pool.close().await;
    }
}

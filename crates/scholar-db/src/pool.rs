//! SQLite connection pool.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use sqlx::{Sqlite, Transaction};
use std::str::FromStr;
use std::time::Duration;

use crate::error::{DbError, DbResult};

/// Connections kept by a file-backed pool.
const MAX_CONNECTIONS: u32 = 5;

/// Shared handle to the scholar database.
#[derive(Debug, Clone)]
pub struct DbPool {
    pool: SqlitePool,
}

impl DbPool {
    /// Open (creating if needed) the database at `url`, e.g. `sqlite://scholar.db`.
    pub async fn connect(url: &str) -> DbResult<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(DbError::ConnectionFailed)?
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .connect_with(options)
            .await
            .map_err(DbError::ConnectionFailed)?;

        tracing::info!(url, "Connected to database");
        Ok(Self { pool })
    }

    /// A private in-memory database.
    ///
    /// Every pooled connection to `sqlite::memory:` would see its own empty
    /// database, so the pool holds exactly one connection and never recycles it.
    pub async fn in_memory() -> DbResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(DbError::ConnectionFailed)?
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(DbError::ConnectionFailed)?;

        Ok(Self { pool })
    }

    #[must_use]
    pub fn inner(&self) -> &SqlitePool {
        &self.pool
    }

    /// Start a transaction. It rolls back when dropped without a commit.
    pub async fn begin(&self) -> DbResult<Transaction<'static, Sqlite>> {
        self.pool.begin().await.map_err(DbError::ConnectionFailed)
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

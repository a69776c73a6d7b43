//! Error types for the scholar-db crate.
//!
//! Wraps `SQLx` errors and classifies them into the shared error taxonomy.

use scholar_core::{ErrorKind, ScholarError};
use thiserror::Error;

/// Database operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// Failed to open the database or acquire a connection.
    #[error("Database connection failed: {0}")]
    ConnectionFailed(#[source] sqlx::Error),

    /// A database migration failed to apply.
    #[error("Migration failed: {0}")]
    MigrationFailed(#[source] sqlx::migrate::MigrateError),

    /// A database query failed to execute.
    #[error("Query failed: {0}")]
    QueryFailed(#[source] sqlx::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A unique constraint rejected the write.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A row failed validation, on its way in or out.
    #[error("Validation failed: {0}")]
    ValidationFailed(String),
}

impl DbError {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationFailed(message.into())
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, DbError::NotFound(_))
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            DbError::NotFound(_) => ErrorKind::NotFound,
            DbError::Conflict(_) => ErrorKind::Conflict,
            DbError::ValidationFailed(_) => ErrorKind::Invalid,
            DbError::ConnectionFailed(_) | DbError::MigrationFailed(_) | DbError::QueryFailed(_) => {
                ErrorKind::Internal
            }
        }
    }
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound("row not found".to_string()),
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                DbError::Conflict(db.message().to_string())
            }
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => DbError::ConnectionFailed(err),
            other => DbError::QueryFailed(other),
        }
    }
}

impl From<DbError> for ScholarError {
    fn from(err: DbError) -> Self {
        ScholarError::new(err.kind(), err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

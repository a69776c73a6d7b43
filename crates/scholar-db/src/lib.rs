//! SQLite persistence for scholar.
//!
//! Query functions take `&mut SqliteConnection` so the caller decides the
//! transaction scope:
//!
//! ```rust,ignore
//! use scholar_db::{DbPool, StudentRow, run_migrations};
//!
//! let pool = DbPool::connect("sqlite://scholar.db").await?;
//! run_migrations(&pool).await?;
//!
//! let mut tx = pool.begin().await?;
//! StudentRow::delete(&mut tx, pid).await?;
//! tx.commit().await?;
//! ```

pub mod error;
pub mod migrations;
pub mod models;
pub mod pool;

pub use error::{DbError, DbResult};
pub use migrations::run_migrations;
pub use models::{MarkRow, StudentRow, SubjectRow};
pub use pool::DbPool;

//! SQLite storage bootstrap, pooling and schema migration entry points.
//!
//! # Responsibility
//! - Open and configure SQLite connections for the belongings store.
//! - Share a bounded set of connections across concurrent callers.
//! - Apply schema migrations in deterministic order.
//!
//! # Invariants
//! - Migration version is tracked via `PRAGMA user_version`.
//! - Core code must not read/write container data before migrations succeed.
//! - A pooled connection is used by at most one caller at a time.
//! - Blocking SQLite work runs off the async executor threads.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub mod migrations;
mod open;
mod pool;

pub use open::{
    open_db, open_db_in_memory, open_pool, open_pool_in_memory, open_pool_with_timeout,
};
pub use pool::{
    ConnectionPool, ConnectionTarget, PooledConnection, SqliteConnectionManager, DEFAULT_WAIT_TIMEOUT,
};

/// File name of the store database inside the data directory.
pub const DB_FILE_NAME: &str = "belongings.db";

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    /// No pooled connection became free within the checkout timeout.
    PoolTimeout {
        waited: Duration,
        pool_size: usize,
    },
    InvalidPoolSize(usize),
    /// Pool construction or checkout failed for a reason other than timeout.
    Pool(String),
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "database schema version {db_version} is newer than supported {latest_supported}"
            ),
            Self::PoolTimeout { waited, pool_size } => write!(
                f,
                "no database connection available after {}ms (pool size {pool_size})",
                waited.as_millis()
            ),
            Self::InvalidPoolSize(size) => {
                write!(f, "connection pool size must be at least 1, got {size}")
            }
            Self::Pool(message) => write!(f, "connection pool error: {message}"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. }
            | Self::PoolTimeout { .. }
            | Self::InvalidPoolSize(_)
            | Self::Pool(_) => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// Resolves the database file path inside a data directory.
pub fn db_path_in(data_dir: impl AsRef<Path>) -> PathBuf {
    data_dir.as_ref().join(DB_FILE_NAME)
}

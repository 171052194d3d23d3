//! Managed SQLite connection pool.
//!
//! # Responsibility
//! - Create bootstrapped SQLite connections on demand through a
//!   `deadpool` manager.
//! - Hand out exclusive access to one connection at a time.
//!
//! # Invariants
//! - Every pooled connection is configured before first use.
//! - In-memory pools hold exactly one connection; a second connection would
//!   see a different database.
//! - Checkout waits at most the configured timeout, then reports
//!   `DbError::PoolTimeout`.

use super::migrations::apply_migrations;
use super::open::configure_connection;
use super::{DbError, DbResult};
use deadpool::managed::{Manager, Metrics, Object, Pool, PoolError, RecycleError, RecycleResult};
use deadpool::Runtime;
use log::warn;
use rusqlite::Connection;
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Default time a caller waits for a free connection.
pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(30);

/// Database a pool connects to.
#[derive(Debug, Clone)]
pub enum ConnectionTarget {
    File(PathBuf),
    /// Private in-memory database, migrated when the connection is created.
    Memory,
}

/// Creates and health-checks SQLite connections for the pool.
#[derive(Debug)]
pub struct SqliteConnectionManager {
    target: ConnectionTarget,
}

impl SqliteConnectionManager {
    pub fn new(target: ConnectionTarget) -> Self {
        Self { target }
    }
}

impl Manager for SqliteConnectionManager {
    type Type = Connection;
    type Error = DbError;

    async fn create(&self) -> Result<Connection, DbError> {
        match &self.target {
            ConnectionTarget::File(path) => {
                let conn = Connection::open(path)?;
                configure_connection(&conn, true)?;
                Ok(conn)
            }
            ConnectionTarget::Memory => {
                let mut conn = Connection::open_in_memory()?;
                configure_connection(&conn, false)?;
                apply_migrations(&mut conn)?;
                Ok(conn)
            }
        }
    }

    async fn recycle(&self, conn: &mut Connection, _metrics: &Metrics) -> RecycleResult<DbError> {
        conn.execute_batch("SELECT 1;")
            .map_err(|err| RecycleError::Backend(DbError::from(err)))
    }
}

/// Exclusive handle to one pooled connection; returned to the pool on drop.
pub type PooledConnection = Object<SqliteConnectionManager>;

/// Shared handle to a managed set of SQLite connections.
///
/// Cloning is cheap; all clones share the same connections.
#[derive(Clone)]
pub struct ConnectionPool {
    inner: Pool<SqliteConnectionManager>,
    wait_timeout: Duration,
}

impl ConnectionPool {
    /// Builds a pool of at most `size` connections to `target`.
    ///
    /// # Errors
    /// - `DbError::InvalidPoolSize` when `size` is zero.
    /// - `DbError::Pool` when the pool cannot be built.
    pub fn new(target: ConnectionTarget, size: usize, wait_timeout: Duration) -> DbResult<Self> {
        if size == 0 {
            return Err(DbError::InvalidPoolSize(size));
        }
        let inner = Pool::builder(SqliteConnectionManager::new(target))
            .max_size(size)
            .wait_timeout(Some(wait_timeout))
            .runtime(Runtime::Tokio1)
            .build()
            .map_err(|err| DbError::Pool(err.to_string()))?;
        Ok(Self {
            inner,
            wait_timeout,
        })
    }

    /// Maximum number of connections owned by this pool.
    pub fn size(&self) -> usize {
        self.inner.status().max_size
    }

    /// Number of created connections currently checked in.
    pub fn idle_count(&self) -> usize {
        self.inner.status().available
    }

    pub fn wait_timeout(&self) -> Duration {
        self.wait_timeout
    }

    /// Checks out one connection, waiting for a free slot when necessary.
    pub async fn get(&self) -> DbResult<PooledConnection> {
        let started_at = Instant::now();
        self.inner.get().await.map_err(|err| match err {
            PoolError::Timeout(_) => {
                let waited = started_at.elapsed();
                warn!(
                    "event=pool_checkout module=db status=error error_code=pool_timeout duration_ms={} pool_size={}",
                    waited.as_millis(),
                    self.size()
                );
                DbError::PoolTimeout {
                    waited,
                    pool_size: self.size(),
                }
            }
            PoolError::Backend(err) => err,
            other => DbError::Pool(other.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{ConnectionPool, ConnectionTarget};
    use crate::db::DbError;
    use std::time::Duration;

    fn memory_pool(wait_timeout: Duration) -> ConnectionPool {
        ConnectionPool::new(ConnectionTarget::Memory, 1, wait_timeout).expect("memory pool")
    }

    #[test]
    fn zero_sized_pool_is_rejected() {
        let result = ConnectionPool::new(ConnectionTarget::Memory, 0, Duration::from_secs(1));
        assert!(matches!(result, Err(DbError::InvalidPoolSize(0))));
    }

    #[tokio::test]
    async fn dropped_connection_is_returned_and_keeps_state() {
        let pool = memory_pool(Duration::from_secs(1));
        {
            let conn = pool.get().await.expect("first checkout");
            conn.execute("INSERT INTO containers (id) VALUES ('box1');", [])
                .expect("insert");
            assert_eq!(pool.idle_count(), 0);
        }
        assert_eq!(pool.idle_count(), 1);
        assert_eq!(pool.size(), 1);

        let conn = pool.get().await.expect("second checkout");
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM containers;", [], |row| row.get(0))
            .expect("count");
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn exhausted_pool_times_out() {
        let pool = memory_pool(Duration::from_millis(20));
        let _held = pool.get().await.expect("checkout");

        let err = pool.get().await.err().expect("second checkout should time out");
        assert!(matches!(err, DbError::PoolTimeout { pool_size: 1, .. }));
    }

    #[tokio::test]
    async fn waiting_checkout_resumes_when_connection_is_returned() {
        let pool = memory_pool(Duration::from_secs(5));
        let held = pool.get().await.expect("checkout");

        let waiter = {
            let pool = pool.clone();
            tokio::spawn(async move { pool.get().await.map(|_| ()) })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        drop(held);

        waiter
            .await
            .expect("waiter task should not panic")
            .expect("waiter should receive the returned connection");
    }
}

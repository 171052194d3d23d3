//! Connection bootstrap utilities for SQLite.
//!
//! # Responsibility
//! - Open file or in-memory SQLite connections and pools.
//! - Configure connection pragmas required by core behavior.
//! - Trigger schema migrations before returning a usable connection.
//!
//! # Invariants
//! - Returned connections have `foreign_keys=ON` and a busy timeout.
//! - File-backed connections run in WAL mode so readers never block writers.
//! - Migrations are applied once, on a bootstrap connection, before the pool
//!   opens any connection of its own.

use super::migrations::apply_migrations;
use super::pool::{ConnectionPool, ConnectionTarget, DEFAULT_WAIT_TIMEOUT};
use super::{DbError, DbResult};
use log::{error, info};
use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens a SQLite database file and applies all pending migrations.
///
/// # Side effects
/// - Performs connection bootstrap and migration checks.
/// - Emits `db_open` logging events with duration and status.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    let started_at = Instant::now();
    info!("event=db_open module=db status=start mode=file");

    let result = Connection::open(path)
        .map_err(DbError::from)
        .and_then(|mut conn| {
            configure_connection(&conn, true)?;
            apply_migrations(&mut conn)?;
            Ok(conn)
        });
    log_open_result("file", started_at, &result);
    result
}

/// Opens an in-memory SQLite database and applies all pending migrations.
pub fn open_db_in_memory() -> DbResult<Connection> {
    let started_at = Instant::now();
    info!("event=db_open module=db status=start mode=memory");

    let result = Connection::open_in_memory()
        .map_err(DbError::from)
        .and_then(|mut conn| {
            configure_connection(&conn, false)?;
            apply_migrations(&mut conn)?;
            Ok(conn)
        });
    log_open_result("memory", started_at, &result);
    result
}

/// Migrates the database file once, then builds a pool of up to `size`
/// connections to it.
///
/// The parent directory is not created here; callers own data-dir setup.
///
/// # Errors
/// - `DbError::InvalidPoolSize` when `size` is zero.
/// - Any open, pragma or migration failure of the bootstrap connection.
pub fn open_pool(path: impl AsRef<Path>, size: usize) -> DbResult<ConnectionPool> {
    open_pool_with_timeout(path, size, DEFAULT_WAIT_TIMEOUT)
}

/// Same as [`open_pool`] with an explicit checkout timeout.
pub fn open_pool_with_timeout(
    path: impl AsRef<Path>,
    size: usize,
    wait_timeout: Duration,
) -> DbResult<ConnectionPool> {
    if size == 0 {
        return Err(DbError::InvalidPoolSize(size));
    }
    let path = path.as_ref();
    drop(open_db(path)?);

    let pool = ConnectionPool::new(ConnectionTarget::File(path.to_path_buf()), size, wait_timeout)?;
    info!("event=pool_open module=db status=ok mode=file pool_size={size}");
    Ok(pool)
}

/// Builds a single-connection pool over a private in-memory database.
///
/// In-memory databases are per-connection, so the pool cannot grow beyond
/// one without losing data visibility.
pub fn open_pool_in_memory() -> DbResult<ConnectionPool> {
    ConnectionPool::new(ConnectionTarget::Memory, 1, DEFAULT_WAIT_TIMEOUT)
}

pub(super) fn configure_connection(conn: &Connection, file_backed: bool) -> DbResult<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    if file_backed {
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| {
            row.get::<_, String>(0)
        })?;
    }
    Ok(())
}

fn log_open_result(mode: &str, started_at: Instant, result: &DbResult<Connection>) {
    match result {
        Ok(_) => info!(
            "event=db_open module=db status=ok mode={} duration_ms={}",
            mode,
            started_at.elapsed().as_millis()
        ),
        Err(err) => error!(
            "event=db_open module=db status=error mode={} duration_ms={} error_code={} error={}",
            mode,
            started_at.elapsed().as_millis(),
            error_code(err),
            err
        ),
    }
}

fn error_code(err: &DbError) -> &'static str {
    match err {
        DbError::Sqlite(_) => "db_open_failed",
        DbError::UnsupportedSchemaVersion { .. } => "db_schema_too_new",
        DbError::PoolTimeout { .. } | DbError::InvalidPoolSize(_) | DbError::Pool(_) => {
            "db_bootstrap_failed"
        }
    }
}

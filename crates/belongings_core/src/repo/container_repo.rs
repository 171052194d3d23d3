//! Container repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide the store operations over `containers` / `container_items`.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Every mutation, including its existence checks, runs in one
//!   `BEGIN IMMEDIATE` transaction, so read-modify-write cycles never
//!   interleave with another writer.
//! - Failure outcomes never leave partial writes behind.
//! - Read results follow container creation order (`containers.rowid`).
//! - SQL runs on the blocking thread pool, never on executor threads.

use crate::db::{ConnectionPool, DbError, DbResult};
use crate::model::container::{Container, ContainerId, ContainerInfoUpdate};
use crate::model::outcome::StoreOutcome;
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Infrastructure failure of a repository call.
///
/// Missing containers/items are not errors; see [`StoreOutcome`].
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// The blocking task running the SQL panicked or was cancelled.
    Task(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Task(message) => write!(f, "storage task failed: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Task(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for container persistence.
#[async_trait]
pub trait ContainerRepository: Send + Sync {
    async fn add_item(&self, container_id: &str, item: &str) -> RepoResult<StoreOutcome>;
    async fn remove_item(&self, container_id: &str, item: &str) -> RepoResult<StoreOutcome>;
    async fn move_item(&self, from_id: &str, to_id: &str, item: &str) -> RepoResult<StoreOutcome>;
    async fn search_item(&self, item: &str) -> RepoResult<Vec<ContainerId>>;
    async fn list_populated(&self) -> RepoResult<Vec<Container>>;
    async fn update_info(
        &self,
        container_id: &str,
        update: &ContainerInfoUpdate,
    ) -> RepoResult<StoreOutcome>;
    async fn get_container(&self, container_id: &str) -> RepoResult<Option<Container>>;
}

/// SQLite-backed container repository over a shared connection pool.
#[derive(Clone)]
pub struct SqliteContainerRepository {
    pool: ConnectionPool,
}

impl SqliteContainerRepository {
    pub fn new(pool: ConnectionPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &ConnectionPool {
        &self.pool
    }

    /// Checks out a connection and runs `f` on the blocking thread pool.
    async fn run<T, F>(&self, f: F) -> RepoResult<T>
    where
        F: FnOnce(&mut Connection) -> DbResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let mut conn = self.pool.get().await?;
        tokio::task::spawn_blocking(move || f(&mut *conn))
            .await
            .map_err(|err| RepoError::Task(err.to_string()))?
            .map_err(RepoError::from)
    }
}

#[async_trait]
impl ContainerRepository for SqliteContainerRepository {
    async fn add_item(&self, container_id: &str, item: &str) -> RepoResult<StoreOutcome> {
        let container_id = container_id.to_string();
        let item = item.to_string();
        self.run(move |conn| add_item_in(conn, container_id, item)).await
    }

    async fn remove_item(&self, container_id: &str, item: &str) -> RepoResult<StoreOutcome> {
        let container_id = container_id.to_string();
        let item = item.to_string();
        self.run(move |conn| remove_item_in(conn, container_id, item)).await
    }

    async fn move_item(&self, from_id: &str, to_id: &str, item: &str) -> RepoResult<StoreOutcome> {
        let from_id = from_id.to_string();
        let to_id = to_id.to_string();
        let item = item.to_string();
        self.run(move |conn| move_item_in(conn, from_id, to_id, item)).await
    }

    async fn search_item(&self, item: &str) -> RepoResult<Vec<ContainerId>> {
        let item = item.to_string();
        self.run(move |conn| search_item_in(conn, &item)).await
    }

    async fn list_populated(&self) -> RepoResult<Vec<Container>> {
        self.run(list_populated_in).await
    }

    async fn update_info(
        &self,
        container_id: &str,
        update: &ContainerInfoUpdate,
    ) -> RepoResult<StoreOutcome> {
        let container_id = container_id.to_string();
        let update = update.clone();
        self.run(move |conn| update_info_in(conn, container_id, &update)).await
    }

    async fn get_container(&self, container_id: &str) -> RepoResult<Option<Container>> {
        let container_id = container_id.to_string();
        self.run(move |conn| get_container_in(conn, &container_id)).await
    }
}

fn add_item_in(
    conn: &mut Connection,
    container_id: String,
    item: String,
) -> DbResult<StoreOutcome> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let created = ensure_container(&tx, &container_id)?;
    append_item(&tx, &container_id, &item)?;
    tx.commit()?;

    Ok(StoreOutcome::Added {
        container_id,
        item,
        created,
    })
}

fn remove_item_in(
    conn: &mut Connection,
    container_id: String,
    item: String,
) -> DbResult<StoreOutcome> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    if !container_exists(&tx, &container_id)? {
        return Ok(StoreOutcome::ContainerNotFound { container_id });
    }

    let Some(position) = first_position(&tx, &container_id, &item)? else {
        return Ok(StoreOutcome::ItemNotFound { container_id, item });
    };

    delete_at(&tx, &container_id, position)?;
    tx.commit()?;

    Ok(StoreOutcome::Removed { container_id, item })
}

fn move_item_in(
    conn: &mut Connection,
    from_id: String,
    to_id: String,
    item: String,
) -> DbResult<StoreOutcome> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    if !container_exists(&tx, &from_id)? {
        return Ok(StoreOutcome::ContainerNotFound {
            container_id: from_id,
        });
    }

    let Some(position) = first_position(&tx, &from_id, &item)? else {
        return Ok(StoreOutcome::ItemNotFound {
            container_id: from_id,
            item,
        });
    };

    delete_at(&tx, &from_id, position)?;
    ensure_container(&tx, &to_id)?;
    append_item(&tx, &to_id, &item)?;
    tx.commit()?;

    Ok(StoreOutcome::Moved {
        from_container_id: from_id,
        to_container_id: to_id,
        item,
    })
}

fn search_item_in(conn: &mut Connection, item: &str) -> DbResult<Vec<ContainerId>> {
    let mut stmt = conn.prepare(
        "SELECT containers.id
         FROM containers
         WHERE EXISTS (
            SELECT 1
            FROM container_items
            WHERE container_items.container_id = containers.id
              AND container_items.item = ?1
         )
         ORDER BY containers.rowid ASC;",
    )?;
    let ids = stmt
        .query_map([item], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ids)
}

fn list_populated_in(conn: &mut Connection) -> DbResult<Vec<Container>> {
    let mut stmt = conn.prepare(
        "SELECT
            containers.id AS id,
            containers.location AS location,
            containers.name AS name,
            container_items.item AS item
         FROM containers
         JOIN container_items ON container_items.container_id = containers.id
         ORDER BY containers.rowid ASC, container_items.position ASC;",
    )?;

    let mut rows = stmt.query([])?;
    let mut containers: Vec<Container> = Vec::new();
    while let Some(row) = rows.next()? {
        let id: String = row.get("id")?;
        let item: String = row.get("item")?;
        match containers.last_mut() {
            Some(current) if current.id == id => current.contents.push(item),
            _ => containers.push(Container {
                id,
                location: row.get("location")?,
                name: row.get("name")?,
                contents: vec![item],
            }),
        }
    }

    Ok(containers)
}

fn update_info_in(
    conn: &mut Connection,
    container_id: String,
    update: &ContainerInfoUpdate,
) -> DbResult<StoreOutcome> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    if !container_exists(&tx, &container_id)? {
        return Ok(StoreOutcome::ContainerNotFound { container_id });
    }

    if update.is_empty() {
        return Ok(StoreOutcome::NoUpdates { container_id });
    }

    tx.execute(
        "UPDATE containers
         SET
            location = CASE WHEN ?2 THEN ?3 ELSE location END,
            name = CASE WHEN ?4 THEN ?5 ELSE name END
         WHERE id = ?1;",
        params![
            container_id,
            update.location.is_some(),
            update.location.as_deref(),
            update.name.is_some(),
            update.name.as_deref(),
        ],
    )?;
    tx.commit()?;

    Ok(StoreOutcome::Updated { container_id })
}

fn get_container_in(conn: &mut Connection, container_id: &str) -> DbResult<Option<Container>> {
    // Deferred read transaction keeps both queries on one snapshot.
    let tx = conn.transaction()?;
    let header = tx
        .query_row(
            "SELECT id, location, name FROM containers WHERE id = ?1;",
            [container_id],
            |row| {
                Ok(Container {
                    id: row.get(0)?,
                    location: row.get(1)?,
                    name: row.get(2)?,
                    contents: Vec::new(),
                })
            },
        )
        .optional()?;

    let Some(mut container) = header else {
        return Ok(None);
    };
    container.contents = load_contents(&tx, container_id)?;
    tx.finish()?;
    Ok(Some(container))
}

fn container_exists(conn: &Connection, container_id: &str) -> DbResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM containers WHERE id = ?1);",
        [container_id],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

/// Inserts an empty container row when missing. Returns `true` on insert.
fn ensure_container(conn: &Connection, container_id: &str) -> DbResult<bool> {
    let inserted = conn.execute(
        "INSERT INTO containers (id) VALUES (?1) ON CONFLICT(id) DO NOTHING;",
        [container_id],
    )?;
    Ok(inserted == 1)
}

fn append_item(conn: &Connection, container_id: &str, item: &str) -> DbResult<()> {
    conn.execute(
        "INSERT INTO container_items (container_id, position, item)
         SELECT ?1, COALESCE(MAX(position), -1) + 1, ?2
         FROM container_items
         WHERE container_id = ?1;",
        params![container_id, item],
    )?;
    Ok(())
}

/// Position of the first occurrence of `item`, if held.
fn first_position(conn: &Connection, container_id: &str, item: &str) -> DbResult<Option<i64>> {
    let position = conn.query_row(
        "SELECT MIN(position)
         FROM container_items
         WHERE container_id = ?1 AND item = ?2;",
        params![container_id, item],
        |row| row.get::<_, Option<i64>>(0),
    )?;
    Ok(position)
}

fn delete_at(conn: &Connection, container_id: &str, position: i64) -> DbResult<()> {
    conn.execute(
        "DELETE FROM container_items WHERE container_id = ?1 AND position = ?2;",
        params![container_id, position],
    )?;
    Ok(())
}

fn load_contents(conn: &Connection, container_id: &str) -> DbResult<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT item
         FROM container_items
         WHERE container_id = ?1
         ORDER BY position ASC;",
    )?;
    let items = stmt
        .query_map([container_id], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(items)
}

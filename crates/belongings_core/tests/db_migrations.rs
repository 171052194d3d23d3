use belongings_core::db::migrations::latest_version;
use belongings_core::db::{db_path_in, open_db, open_db_in_memory, open_pool, DbError};
use belongings_core::{open_service, ContainerRepository, StoreOutcome};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "containers");
    assert_table_exists(&conn, "container_items");
    assert_table_missing(&conn, "belongings");
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = db_path_in(dir.path());

    let conn_first = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_first), latest_version());
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    assert_table_exists(&conn_second, "containers");
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn file_backed_connections_use_wal() {
    let dir = tempfile::tempdir().unwrap();
    let conn = open_db(db_path_in(dir.path())).unwrap();

    let mode: String = conn
        .query_row("PRAGMA journal_mode;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(mode.to_ascii_lowercase(), "wal");
}

#[test]
fn open_pool_rejects_zero_size() {
    let dir = tempfile::tempdir().unwrap();
    let result = open_pool(db_path_in(dir.path()), 0);
    assert!(matches!(result, Err(DbError::InvalidPoolSize(0))));
}

#[tokio::test]
async fn legacy_single_table_database_is_imported_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = db_path_in(dir.path());

    let legacy = Connection::open(&path).unwrap();
    legacy
        .execute_batch(
            "CREATE TABLE belongings (
                id TEXT PRIMARY KEY,
                location TEXT,
                container_name TEXT,
                contents TEXT
            );
            INSERT INTO belongings (id, location, container_name, contents)
                VALUES ('box1', 'Attic', 'Winter', 'hat,scarf,hat');
            INSERT INTO belongings (id, contents) VALUES ('box2', 'lamp');
            INSERT INTO belongings (id, contents) VALUES ('emptied', '');",
        )
        .unwrap();
    drop(legacy);

    let service = open_service(&path, 2).unwrap();

    let box1 = service.get_container("box1").await.unwrap().unwrap();
    assert_eq!(box1.location.as_deref(), Some("Attic"));
    assert_eq!(box1.name.as_deref(), Some("Winter"));
    assert_eq!(box1.contents, vec!["hat", "scarf", "hat"]);

    let box2 = service.get_container("box2").await.unwrap().unwrap();
    assert_eq!(box2.contents, vec!["lamp"]);

    let emptied = service.get_container("emptied").await.unwrap().unwrap();
    assert!(emptied.contents.is_empty());

    let populated = service.repo().list_populated().await.unwrap();
    let ids = populated
        .iter()
        .map(|container| container.id.as_str())
        .collect::<Vec<_>>();
    assert_eq!(ids, vec!["box1", "box2"]);

    let conn = Connection::open(&path).unwrap();
    assert_eq!(schema_version(&conn), latest_version());
    assert_table_missing(&conn, "belongings");
}

#[tokio::test]
async fn legacy_empty_segments_are_imported_and_removable() {
    let dir = tempfile::tempdir().unwrap();
    let path = db_path_in(dir.path());

    let legacy = Connection::open(&path).unwrap();
    legacy
        .execute_batch(
            "CREATE TABLE belongings (
                id TEXT PRIMARY KEY,
                location TEXT,
                container_name TEXT,
                contents TEXT
            );
            INSERT INTO belongings (id, contents) VALUES ('box1', 'hat,,scarf');",
        )
        .unwrap();
    drop(legacy);

    let service = open_service(&path, 1).unwrap();
    let box1 = service.get_container("box1").await.unwrap().unwrap();
    assert_eq!(box1.contents, vec!["hat", "", "scarf"]);

    let outcome = service.remove_item("box1", "").await.unwrap();
    assert_eq!(
        outcome,
        StoreOutcome::Removed {
            container_id: "box1".to_string(),
            item: String::new(),
        }
    );
    let box1 = service.get_container("box1").await.unwrap().unwrap();
    assert_eq!(box1.contents, vec!["hat", "scarf"]);
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn table_exists(conn: &Connection, table_name: &str) -> bool {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    exists == 1
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    assert!(
        table_exists(conn, table_name),
        "table {table_name} does not exist"
    );
}

fn assert_table_missing(conn: &Connection, table_name: &str) {
    assert!(
        !table_exists(conn, table_name),
        "table {table_name} should not exist"
    );
}

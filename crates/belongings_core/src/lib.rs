//! Core persistence and mutation logic for the belongings store.
//! This crate is the single source of truth for container invariants;
//! every front end calls into [`BelongingsService`].

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{
    default_log_level, init_logging, init_stderr_logging, logging_status, LogTarget,
};
pub use model::container::{Container, ContainerId, ContainerInfoUpdate};
pub use model::outcome::{render_inventory, SearchOutcome, StoreOutcome};
pub use repo::container_repo::{
    ContainerRepository, RepoError, RepoResult, SqliteContainerRepository,
};
pub use service::belongings_service::BelongingsService;

/// Service type used by the HTTP server and the CLI.
pub type SqliteBelongingsService = BelongingsService<SqliteContainerRepository>;

/// Opens (or creates) the store at `path` with a pool of `pool_size`
/// connections.
pub fn open_service(
    path: impl AsRef<std::path::Path>,
    pool_size: usize,
) -> db::DbResult<SqliteBelongingsService> {
    let pool = db::open_pool(path, pool_size)?;
    Ok(BelongingsService::new(SqliteContainerRepository::new(pool)))
}

/// Opens a private in-memory store, mainly for tests.
pub fn open_service_in_memory() -> db::DbResult<SqliteBelongingsService> {
    let pool = db::open_pool_in_memory()?;
    Ok(BelongingsService::new(SqliteContainerRepository::new(pool)))
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

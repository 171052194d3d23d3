//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Ids and item names are stored verbatim; no value is rejected.
//! - Repository APIs return semantic outcomes (`ContainerNotFound`,
//!   `ItemNotFound`) as values and reserve `Err` for storage failures.

pub mod container_repo;

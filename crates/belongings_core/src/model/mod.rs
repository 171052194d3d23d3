//! Domain model for containers and operation outcomes.
//!
//! # Responsibility
//! - Define the container record and its partial-update shape.
//! - Define structured outcomes returned by store operations.
//!
//! # Invariants
//! - Containers are identified by a client-supplied string id.
//! - Containers are never deleted; empty contents are a valid state.

pub mod container;
pub mod outcome;

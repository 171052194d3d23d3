//! Container domain model.
//!
//! # Responsibility
//! - Define the container record shared by every store operation.
//!
//! # Invariants
//! - `id` is client-supplied and unique; any string is accepted.
//! - Item names are opaque strings, including empty ones and ones with `,`.
//! - `contents` keeps insertion order; duplicates are allowed.
//! - A container may exist with empty `contents`.

use serde::{Deserialize, Serialize};

/// Client-supplied container identifier.
pub type ContainerId = String;

/// A named place that holds items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Container {
    pub id: ContainerId,
    /// Free-form physical placement, e.g. `Attic`.
    pub location: Option<String>,
    /// Display label. The id doubles as the label when unset.
    pub name: Option<String>,
    /// Item names in insertion order.
    pub contents: Vec<String>,
}

impl Container {
    /// Creates an empty container with no location or name.
    pub fn new(id: impl Into<ContainerId>) -> Self {
        Self {
            id: id.into(),
            location: None,
            name: None,
            contents: Vec::new(),
        }
    }

    /// Returns the label to show for this container.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(self.id.as_str())
    }

    /// Returns whether an exact match of `item` is held.
    pub fn contains(&self, item: &str) -> bool {
        self.contents.iter().any(|held| held == item)
    }

    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }

    /// One-line inventory description used by digest outputs.
    ///
    /// Format: `Container ID: {id}[, Location: {location}][, Name: {name}] contains: {a,b}`
    pub fn describe(&self) -> String {
        let mut line = format!("Container ID: {}", self.id);
        if let Some(location) = self.location.as_deref().filter(|value| !value.is_empty()) {
            line.push_str(&format!(", Location: {location}"));
        }
        if let Some(name) = self.name.as_deref().filter(|value| !value.is_empty()) {
            line.push_str(&format!(", Name: {name}"));
        }
        line.push_str(&format!(" contains: {}", self.contents.join(",")));
        line
    }
}

/// Partial update of container annotations.
///
/// `None` leaves the stored value unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerInfoUpdate {
    pub location: Option<String>,
    pub name: Option<String>,
}

impl ContainerInfoUpdate {
    /// Returns whether no field was supplied.
    pub fn is_empty(&self) -> bool {
        self.location.is_none() && self.name.is_none()
    }
}

//! Structured results of store operations.
//!
//! Business outcomes such as "container not found" are values, not errors.
//! Only infrastructure failures travel through `Err`.

use super::container::{Container, ContainerId};
use serde::Serialize;
use std::fmt::{Display, Formatter};

/// Result of one mutating store operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum StoreOutcome {
    Added {
        container_id: ContainerId,
        item: String,
        /// `true` when the container did not exist before this call.
        created: bool,
    },
    Removed {
        container_id: ContainerId,
        item: String,
    },
    Moved {
        from_container_id: ContainerId,
        to_container_id: ContainerId,
        item: String,
    },
    Updated {
        container_id: ContainerId,
    },
    ContainerNotFound {
        container_id: ContainerId,
    },
    ItemNotFound {
        container_id: ContainerId,
        item: String,
    },
    /// Update called without any field; nothing was written.
    NoUpdates {
        container_id: ContainerId,
    },
}

impl StoreOutcome {
    /// Returns whether the call was rejected because a referenced container or
    /// item does not exist.
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Self::ContainerNotFound { .. } | Self::ItemNotFound { .. }
        )
    }

    /// Returns whether storage was changed by the call.
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Self::Added { .. } | Self::Removed { .. } | Self::Moved { .. } | Self::Updated { .. }
        )
    }

    /// Stable short code for logs and API payloads.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Added { .. } => "added",
            Self::Removed { .. } => "removed",
            Self::Moved { .. } => "moved",
            Self::Updated { .. } => "updated",
            Self::ContainerNotFound { .. } => "container_not_found",
            Self::ItemNotFound { .. } => "item_not_found",
            Self::NoUpdates { .. } => "no_updates",
        }
    }
}

impl Display for StoreOutcome {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Added {
                container_id, item, ..
            } => write!(f, "Added {item} to container {container_id}"),
            Self::Removed { container_id, item } => {
                write!(f, "Removed {item} from container {container_id}")
            }
            Self::Moved {
                from_container_id,
                to_container_id,
                item,
            } => write!(f, "Moved {item} from {from_container_id} to {to_container_id}"),
            Self::Updated { container_id } => {
                write!(f, "Updated container {container_id} information")
            }
            Self::ContainerNotFound { container_id } => {
                write!(f, "Container {container_id} not found")
            }
            Self::ItemNotFound { container_id, item } => {
                write!(f, "Item {item} not found in container {container_id}")
            }
            Self::NoUpdates { .. } => write!(f, "No updates provided"),
        }
    }
}

/// Containers holding one item, in container creation order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchOutcome {
    pub item: String,
    pub container_ids: Vec<ContainerId>,
}

impl SearchOutcome {
    pub fn is_empty(&self) -> bool {
        self.container_ids.is_empty()
    }
}

impl Display for SearchOutcome {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.container_ids.is_empty() {
            write!(f, "Item {} not found in any container", self.item)
        } else {
            write!(
                f,
                "Item {} found in containers: {}",
                self.item,
                self.container_ids.join(", ")
            )
        }
    }
}

/// Renders the inventory digest, one line per container.
pub fn render_inventory(containers: &[Container]) -> String {
    containers
        .iter()
        .map(Container::describe)
        .collect::<Vec<_>>()
        .join("\n")
}

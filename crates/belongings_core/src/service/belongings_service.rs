//! Belongings use-case service.
//!
//! # Responsibility
//! - Provide the store operations shared by every front end.
//! - Delegate persistence to repository implementations.
//! - Emit one metadata-only log event per call.
//!
//! # Invariants
//! - Service APIs never bypass repository persistence contracts.
//! - Item and container names are never written to logs, only their lengths.

use crate::model::container::{Container, ContainerInfoUpdate};
use crate::model::outcome::{SearchOutcome, StoreOutcome};
use crate::repo::container_repo::{ContainerRepository, RepoError, RepoResult};
use log::{debug, error, info};
use std::time::Instant;

/// Use-case service over a container repository.
pub struct BelongingsService<R: ContainerRepository> {
    repo: R,
}

impl<R: ContainerRepository> BelongingsService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Returns the underlying repository.
    pub fn repo(&self) -> &R {
        &self.repo
    }

    /// Appends `item` to a container, creating the container when unknown.
    pub async fn add_item(&self, container_id: &str, item: &str) -> RepoResult<StoreOutcome> {
        let started_at = Instant::now();
        let result = self.repo.add_item(container_id, item).await;
        log_mutation("item_add", item.len(), started_at, &result);
        result
    }

    /// Removes the first occurrence of `item` from a container.
    ///
    /// # Contract
    /// - `ContainerNotFound` when the container does not exist.
    /// - `ItemNotFound` when no exact match is held; nothing is written.
    pub async fn remove_item(&self, container_id: &str, item: &str) -> RepoResult<StoreOutcome> {
        let started_at = Instant::now();
        let result = self.repo.remove_item(container_id, item).await;
        log_mutation("item_remove", item.len(), started_at, &result);
        result
    }

    /// Moves the first occurrence of `item` between containers in one
    /// transaction, creating the destination when unknown.
    pub async fn move_item(
        &self,
        from_id: &str,
        to_id: &str,
        item: &str,
    ) -> RepoResult<StoreOutcome> {
        let started_at = Instant::now();
        let result = self.repo.move_item(from_id, to_id, item).await;
        log_mutation("item_move", item.len(), started_at, &result);
        result
    }

    /// Finds every container holding an exact match of `item`.
    pub async fn search_item(&self, item: &str) -> RepoResult<SearchOutcome> {
        let started_at = Instant::now();
        match self.repo.search_item(item).await {
            Ok(container_ids) => {
                debug!(
                    "event=item_search module=service status=ok item_len={} hits={} duration_ms={}",
                    item.len(),
                    container_ids.len(),
                    started_at.elapsed().as_millis()
                );
                Ok(SearchOutcome {
                    item: item.to_string(),
                    container_ids,
                })
            }
            Err(err) => {
                log_error("item_search", started_at, &err);
                Err(err)
            }
        }
    }

    /// Lists every container holding at least one item.
    pub async fn list_all_containers(&self) -> RepoResult<Vec<Container>> {
        let started_at = Instant::now();
        let result = self.repo.list_populated().await;
        match &result {
            Ok(containers) => debug!(
                "event=containers_list module=service status=ok count={} duration_ms={}",
                containers.len(),
                started_at.elapsed().as_millis()
            ),
            Err(err) => log_error("containers_list", started_at, err),
        }
        result
    }

    /// Applies a partial update of location and/or name.
    ///
    /// # Contract
    /// - Never creates a container.
    /// - Omitted fields keep their stored values.
    /// - An empty update reports `NoUpdates` without writing.
    pub async fn update_container_info(
        &self,
        container_id: &str,
        update: &ContainerInfoUpdate,
    ) -> RepoResult<StoreOutcome> {
        let started_at = Instant::now();
        let result = self.repo.update_info(container_id, update).await;
        log_mutation("container_update", 0, started_at, &result);
        result
    }

    /// Gets one container by id, including empty ones.
    pub async fn get_container(&self, container_id: &str) -> RepoResult<Option<Container>> {
        let started_at = Instant::now();
        let result = self.repo.get_container(container_id).await;
        if let Err(err) = &result {
            log_error("container_get", started_at, err);
        }
        result
    }
}

fn log_mutation(
    event: &str,
    item_len: usize,
    started_at: Instant,
    result: &RepoResult<StoreOutcome>,
) {
    match result {
        Ok(outcome) if outcome.is_failure() => info!(
            "event={} module=service status=rejected outcome={} item_len={} duration_ms={}",
            event,
            outcome.code(),
            item_len,
            started_at.elapsed().as_millis()
        ),
        Ok(outcome) => info!(
            "event={} module=service status=ok outcome={} item_len={} duration_ms={}",
            event,
            outcome.code(),
            item_len,
            started_at.elapsed().as_millis()
        ),
        Err(err) => log_error(event, started_at, err),
    }
}

fn log_error(event: &str, started_at: Instant, err: &RepoError) {
    let error_code = match err {
        RepoError::Db(_) => "db_error",
        RepoError::Task(_) => "task_failed",
    };
    error!(
        "event={} module=service status=error error_code={} duration_ms={} error={}",
        event,
        error_code,
        started_at.elapsed().as_millis(),
        err
    );
}

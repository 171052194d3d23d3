//! REST routes and router assembly.
//!
//! # Responsibility
//! - Map the store operations onto JSON endpoints over the shared service.
//! - Mount the MCP endpoint at `/mcp` and the `/health` check.
//! - Log one metadata-only event per HTTP request.
//!
//! # Invariants
//! - Not-found outcomes answer 404 with the outcome text as `error`.
//! - Missing fields and malformed bodies answer 400 before the store is touched.
//! - Request logs carry method, path and status only, never bodies.

use std::time::Instant;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, Request, State};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post};
use axum::{Json, Router};
use belongings_core::{render_inventory, Container, ContainerInfoUpdate, StoreOutcome};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::errors::ApiError;
use crate::mcp::mcp_service;
use crate::state::AppState;
use crate::tools::EMPTY_INVENTORY_TEXT;

#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub version: &'static str,
}

#[derive(Debug, Serialize)]
pub struct MessageBody {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct SearchBody {
    pub message: String,
    pub containers: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct InventoryBody {
    pub message: String,
    pub containers: Vec<Container>,
}

#[derive(Debug, Deserialize)]
pub struct ItemRequest {
    pub container_id: Option<String>,
    pub item: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MoveRequest {
    pub from_container_id: Option<String>,
    pub to_container_id: Option<String>,
    pub item: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateInfoRequest {
    pub container_id: Option<String>,
    pub location: Option<String>,
    pub container_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub item: Option<String>,
}

fn required(value: Option<String>, field: &str) -> Result<String, ApiError> {
    value.ok_or_else(|| ApiError::bad_request(format!("missing required field `{field}`")))
}

fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| ApiError::bad_request(rejection.body_text()))
}

/// Maps a store outcome to a response: not-found outcomes are 404s.
fn outcome_response(outcome: StoreOutcome) -> Result<Json<MessageBody>, ApiError> {
    if outcome.is_failure() {
        return Err(ApiError::not_found(outcome.to_string()));
    }
    Ok(Json(MessageBody {
        message: outcome.to_string(),
    }))
}

pub async fn health() -> Json<Health> {
    Json(Health {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn add_item(
    State(state): State<AppState>,
    payload: Result<Json<ItemRequest>, JsonRejection>,
) -> Result<Json<MessageBody>, ApiError> {
    let body = json_body(payload)?;
    let container_id = required(body.container_id, "container_id")?;
    let item = required(body.item, "item")?;
    let outcome = state.service.add_item(&container_id, &item).await?;
    outcome_response(outcome)
}

async fn remove_item(
    State(state): State<AppState>,
    payload: Result<Json<ItemRequest>, JsonRejection>,
) -> Result<Json<MessageBody>, ApiError> {
    let body = json_body(payload)?;
    let container_id = required(body.container_id, "container_id")?;
    let item = required(body.item, "item")?;
    let outcome = state.service.remove_item(&container_id, &item).await?;
    outcome_response(outcome)
}

async fn move_item(
    State(state): State<AppState>,
    payload: Result<Json<MoveRequest>, JsonRejection>,
) -> Result<Json<MessageBody>, ApiError> {
    let body = json_body(payload)?;
    let from_id = required(body.from_container_id, "from_container_id")?;
    let to_id = required(body.to_container_id, "to_container_id")?;
    let item = required(body.item, "item")?;
    let outcome = state.service.move_item(&from_id, &to_id, &item).await?;
    outcome_response(outcome)
}

async fn search_item(
    State(state): State<AppState>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> Result<Json<SearchBody>, ApiError> {
    let Query(query) = query.map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
    let item = required(query.item, "item")?;
    let search = state.service.search_item(&item).await?;
    Ok(Json(SearchBody {
        message: search.to_string(),
        containers: search.container_ids,
    }))
}

async fn get_all_items(State(state): State<AppState>) -> Result<Json<InventoryBody>, ApiError> {
    let containers = state.service.list_all_containers().await?;
    let message = if containers.is_empty() {
        EMPTY_INVENTORY_TEXT.to_string()
    } else {
        render_inventory(&containers)
    };
    Ok(Json(InventoryBody {
        message,
        containers,
    }))
}

async fn update_container_info(
    State(state): State<AppState>,
    payload: Result<Json<UpdateInfoRequest>, JsonRejection>,
) -> Result<Json<MessageBody>, ApiError> {
    let body = json_body(payload)?;
    let container_id = required(body.container_id, "container_id")?;
    let update = ContainerInfoUpdate {
        location: body.location,
        name: body.container_name,
    };
    let outcome = state
        .service
        .update_container_info(&container_id, &update)
        .await?;
    outcome_response(outcome)
}

async fn get_container(
    State(state): State<AppState>,
    Path(container_id): Path<String>,
) -> Result<Json<Container>, ApiError> {
    let container = state.service.get_container(&container_id).await?;
    container.map(Json).ok_or_else(|| {
        ApiError::not_found(StoreOutcome::ContainerNotFound { container_id }.to_string())
    })
}

async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started_at = Instant::now();
    let response = next.run(request).await;
    let status = response.status();
    let duration_ms = started_at.elapsed().as_millis();
    if status.is_server_error() {
        warn!(
            "event=http_request module=server status=error method={} path={} http_status={} duration_ms={}",
            method,
            path,
            status.as_u16(),
            duration_ms
        );
    } else {
        info!(
            "event=http_request module=server status=ok method={} path={} http_status={} duration_ms={}",
            method,
            path,
            status.as_u16(),
            duration_ms
        );
    }
    response
}

/// Builds the full application router over one shared service.
pub fn build_router(state: AppState) -> Router {
    let store = Router::new()
        .route("/add_item", post(add_item))
        .route("/remove_item", post(remove_item))
        .route("/move_item", post(move_item))
        .route("/search_item", get(search_item))
        .route("/get_all_items", get(get_all_items))
        .route("/update_container_info", post(update_container_info))
        .route("/containers/:container_id", get(get_container));

    let mcp = mcp_service(&state);

    Router::new()
        .route("/health", get(health))
        .merge(store)
        .nest_service("/mcp", mcp)
        .with_state(state)
        .layer(middleware::from_fn(log_requests))
}

use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use belongings_core::open_service_in_memory;
use belongings_server::{build_router, AppState};
use futures::StreamExt;
use serde_json::{json, Value};
use tower::ServiceExt;

const BODY_LIMIT: usize = 64 * 1024;
const MCP_SESSION_HEADER: &str = "mcp-session-id";

fn app() -> Router {
    let service = open_service_in_memory().unwrap();
    build_router(AppState::new(service))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), BODY_LIMIT).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

async fn post_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

#[tokio::test]
async fn health_reports_ok_and_version() {
    let app = app();
    let (status, body) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn add_move_search_and_list_through_rest() {
    let app = app();

    let (status, body) = post_json(
        &app,
        "/add_item",
        json!({"container_id": "box1", "item": "hat"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Added hat to container box1");

    post_json(
        &app,
        "/add_item",
        json!({"container_id": "box1", "item": "scarf"}),
    )
    .await;

    let (status, body) = post_json(
        &app,
        "/move_item",
        json!({"from_container_id": "box1", "to_container_id": "box2", "item": "hat"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Moved hat from box1 to box2");

    let (status, body) = get(&app, "/search_item?item=hat").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Item hat found in containers: box2");
    assert_eq!(body["containers"], json!(["box2"]));

    let (status, body) = get(&app, "/get_all_items").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["message"],
        "Container ID: box1 contains: scarf\nContainer ID: box2 contains: hat"
    );
    assert_eq!(body["containers"][0]["id"], "box1");
    assert_eq!(body["containers"][0]["contents"], json!(["scarf"]));
    assert_eq!(body["containers"][1]["contents"], json!(["hat"]));
}

#[tokio::test]
async fn not_found_outcomes_map_to_404() {
    let app = app();

    let (status, body) = post_json(
        &app,
        "/remove_item",
        json!({"container_id": "ghost", "item": "hat"}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Container ghost not found");

    post_json(
        &app,
        "/add_item",
        json!({"container_id": "box1", "item": "hat"}),
    )
    .await;
    let (status, body) = post_json(
        &app,
        "/move_item",
        json!({"from_container_id": "box1", "to_container_id": "box2", "item": "gloves"}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Item gloves not found in container box1");

    let (status, body) = get(&app, "/containers/box2").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Container box2 not found");
}

#[tokio::test]
async fn update_info_and_show_container() {
    let app = app();
    post_json(
        &app,
        "/add_item",
        json!({"container_id": "box1", "item": "hat"}),
    )
    .await;

    let (status, body) = post_json(
        &app,
        "/update_container_info",
        json!({"container_id": "box1", "location": "Attic"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Updated container box1 information");

    let (status, body) = post_json(
        &app,
        "/update_container_info",
        json!({"container_id": "box1"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "No updates provided");

    let (status, body) = get(&app, "/containers/box1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["location"], "Attic");
    assert_eq!(body["name"], Value::Null);
    assert_eq!(body["contents"], json!(["hat"]));
}

#[tokio::test]
async fn malformed_requests_are_rejected_with_400() {
    let app = app();

    let (status, body) = post_json(&app, "/add_item", json!({"container_id": "box1"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "missing required field `item`");

    let request = Request::builder()
        .method(Method::POST)
        .uri("/add_item")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, _) = get(&app, "/search_item").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = get(&app, "/get_all_items").await;
    assert_eq!(body["message"], "No containers hold any items");
    assert_eq!(body["containers"], json!([]));
}

#[tokio::test]
async fn blank_values_are_accepted_over_rest() {
    let app = app();

    let (status, body) = post_json(
        &app,
        "/add_item",
        json!({"container_id": "  ", "item": ""}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Added  to container   ");

    let (status, body) = post_json(
        &app,
        "/remove_item",
        json!({"container_id": "  ", "item": ""}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Removed  from container   ");
}

fn mcp_request(session_id: Option<&str>, message: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri("/mcp")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::ACCEPT, "application/json, text/event-stream");
    if let Some(session_id) = session_id {
        builder = builder.header(MCP_SESSION_HEADER, session_id);
    }
    builder.body(Body::from(message.to_string())).unwrap()
}

/// Reads response frames until one contains `needle`; returns all text read.
async fn read_until(response: axum::response::Response, needle: &str) -> String {
    let mut frames = response.into_body().into_data_stream();
    let mut text = String::new();
    while !text.contains(needle) {
        let frame = tokio::time::timeout(Duration::from_secs(5), frames.next())
            .await
            .expect("frame before timeout")
            .expect("stream still open")
            .unwrap();
        text.push_str(&String::from_utf8_lossy(&frame));
    }
    text
}

#[tokio::test]
async fn mcp_endpoint_initializes_and_calls_tools() {
    let app = app();

    let response = app
        .clone()
        .oneshot(mcp_request(
            None,
            json!({
                "jsonrpc": "2.0",
                "id": 1,
                "method": "initialize",
                "params": {
                    "protocolVersion": "2025-03-26",
                    "capabilities": {},
                    "clientInfo": {"name": "http-api-test", "version": "0.0.0"}
                }
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let session_id = response.headers()[MCP_SESSION_HEADER]
        .to_str()
        .unwrap()
        .to_string();
    let init = read_until(response, "serverInfo").await;
    assert!(init.contains("Track items in containers"));
    assert!(init.contains("\"tools\""));

    let response = app
        .clone()
        .oneshot(mcp_request(
            Some(&session_id),
            json!({"jsonrpc": "2.0", "method": "notifications/initialized"}),
        ))
        .await
        .unwrap();
    assert!(response.status().is_success());

    let response = app
        .clone()
        .oneshot(mcp_request(
            Some(&session_id),
            json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"}),
        ))
        .await
        .unwrap();
    let listing = read_until(response, "update_container_info").await;
    assert!(listing.contains("add_item"));

    let response = app
        .clone()
        .oneshot(mcp_request(
            Some(&session_id),
            json!({
                "jsonrpc": "2.0",
                "id": 3,
                "method": "tools/call",
                "params": {
                    "name": "add_item",
                    "arguments": {"container_id": "box1", "item": "hat"}
                }
            }),
        ))
        .await
        .unwrap();
    let added = read_until(response, "isError").await;
    assert!(added.contains("Added hat to container box1"));
    assert!(added.contains("\"isError\":false"));

    let response = app
        .clone()
        .oneshot(mcp_request(
            Some(&session_id),
            json!({
                "jsonrpc": "2.0",
                "id": 4,
                "method": "tools/call",
                "params": {
                    "name": "remove_item",
                    "arguments": {"container_id": "box1", "item": "gloves"}
                }
            }),
        ))
        .await
        .unwrap();
    let missing = read_until(response, "isError").await;
    assert!(missing.contains("Item gloves not found in container box1"));
    assert!(missing.contains("\"isError\":true"));

    let (_, body) = get(&app, "/containers/box1").await;
    assert_eq!(body["contents"], json!(["hat"]));
}

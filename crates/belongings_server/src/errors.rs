//! HTTP-facing error types.
//!
//! # Invariants
//! - Every error response body is `{"error": "<message>"}`.
//! - Storage failures map to 500 and are logged; malformed requests map
//!   to 400.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use belongings_core::db::DbError;
use belongings_core::RepoError;
use log::error;
use thiserror::Error;

/// Error payload returned by REST handlers.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl From<RepoError> for ApiError {
    fn from(value: RepoError) -> Self {
        let error_code = match &value {
            RepoError::Db(_) => "db_error",
            RepoError::Task(_) => "task_failed",
        };
        error!(
            "event=http_storage_error module=server status=error error_code={} error={}",
            error_code, value
        );
        Self::internal(format!("storage error: {value}"))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(serde_json::json!({ "error": self.message })),
        )
            .into_response()
    }
}

/// Failure while starting or running the HTTP server.
#[derive(Debug, Error)]
pub enum ServeError {
    #[error("invalid listen address `{0}`")]
    InvalidAddress(String),
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to open store: {0}")]
    Store(#[from] DbError),
}

//! HTTP front end for the belongings store: REST routes and an MCP endpoint
//! exposing the tool registry, all over one shared core service.

pub mod errors;
pub mod mcp;
pub mod routes;
pub mod startup;
pub mod state;
pub mod tools;

pub use errors::{ApiError, ServeError};
pub use mcp::{mcp_service, BelongingsMcp};
pub use routes::build_router;
pub use startup::{serve, serve_on, ServerConfig, DEFAULT_HOST, DEFAULT_PORT};
pub use state::AppState;
pub use tools::{ToolRegistry, SERVER_INSTRUCTIONS};

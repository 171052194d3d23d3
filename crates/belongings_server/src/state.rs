//! Shared handler state.

use crate::tools::ToolRegistry;
use belongings_core::SqliteBelongingsService;
use std::sync::Arc;

/// Core service and tool registry shared by REST handlers and MCP sessions.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<SqliteBelongingsService>,
    pub tools: Arc<ToolRegistry>,
}

impl AppState {
    /// Wraps a service and registers the belongings tools over it.
    pub fn new(service: SqliteBelongingsService) -> Self {
        Self {
            service: Arc::new(service),
            tools: Arc::new(ToolRegistry::with_belongings_tools()),
        }
    }
}

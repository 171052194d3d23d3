//! MCP endpoint over the belongings tool registry.
//!
//! # Responsibility
//! - Answer MCP `initialize`, `tools/list` and `tools/call` requests.
//! - Serve them over the streamable HTTP transport mounted at `/mcp`.
//!
//! # Invariants
//! - Tool failures (not-found outcomes, bad arguments, unknown names) are
//!   `CallToolResult`s with `is_error` set, never JSON-RPC errors.
//! - Every session shares the one core service held by [`AppState`].

use crate::state::AppState;
use crate::tools::{result_text, ToolRegistry, SERVER_INSTRUCTIONS};
use belongings_core::SqliteBelongingsService;
use log::{info, warn};
use rmcp::model::{
    CallToolRequestParam, CallToolResult, ListToolsResult, PaginatedRequestParam,
    ServerCapabilities, ServerInfo,
};
use rmcp::service::RequestContext;
use rmcp::transport::streamable_http_server::session::local::LocalSessionManager;
use rmcp::transport::streamable_http_server::{StreamableHttpServerConfig, StreamableHttpService};
use rmcp::{ErrorData, RoleServer, ServerHandler};
use std::sync::Arc;
use std::time::Instant;

/// Name reported in the MCP `serverInfo` block.
pub const SERVER_NAME: &str = "belongings";

/// MCP server handler; one clone serves each session.
#[derive(Clone)]
pub struct BelongingsMcp {
    service: Arc<SqliteBelongingsService>,
    tools: Arc<ToolRegistry>,
}

impl BelongingsMcp {
    pub fn new(service: Arc<SqliteBelongingsService>, tools: Arc<ToolRegistry>) -> Self {
        Self { service, tools }
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::new(Arc::clone(&state.service), Arc::clone(&state.tools))
    }

    /// Runs one tool call and logs its outcome without argument values.
    pub async fn dispatch(&self, request: CallToolRequestParam) -> CallToolResult {
        let started_at = Instant::now();
        let arguments = request.arguments.unwrap_or_default();
        let result = self
            .tools
            .call(request.name.as_ref(), arguments, &self.service)
            .await;
        if result.is_error == Some(true) {
            warn!(
                "event=mcp_tool_call module=server status=rejected tool={} duration_ms={} detail_len={}",
                request.name,
                started_at.elapsed().as_millis(),
                result_text(&result).len()
            );
        } else {
            info!(
                "event=mcp_tool_call module=server status=ok tool={} duration_ms={}",
                request.name,
                started_at.elapsed().as_millis()
            );
        }
        result
    }
}

impl ServerHandler for BelongingsMcp {
    fn get_info(&self) -> ServerInfo {
        let mut info = ServerInfo::default();
        info.capabilities = ServerCapabilities::builder().enable_tools().build();
        info.server_info.name = SERVER_NAME.to_string();
        info.server_info.version = env!("CARGO_PKG_VERSION").to_string();
        info.instructions = Some(SERVER_INSTRUCTIONS.to_string());
        info
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, ErrorData> {
        Ok(ListToolsResult {
            tools: self.tools.list_tools(),
            next_cursor: None,
            ..Default::default()
        })
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        Ok(self.dispatch(request).await)
    }
}

/// Streamable HTTP transport serving one [`BelongingsMcp`] per session.
pub fn mcp_service(state: &AppState) -> StreamableHttpService<BelongingsMcp, LocalSessionManager> {
    let handler = BelongingsMcp::from_state(state);
    StreamableHttpService::new(
        move || Ok(handler.clone()),
        Arc::new(LocalSessionManager::default()),
        StreamableHttpServerConfig::default(),
    )
}

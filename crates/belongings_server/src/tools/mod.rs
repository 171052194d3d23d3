//! Tool registry for agent-invokable store actions.
//!
//! Each store operation is registered as an independently callable MCP tool
//! with a natural-language description and a JSON schema for its named string
//! arguments. Results are human-readable text; not-found outcomes and bad
//! arguments come back as `is_error` results rather than protocol errors.

mod belongings;

use async_trait::async_trait;
use belongings_core::{RepoError, SqliteBelongingsService};
use rmcp::model::{CallToolResult, Content, Tool};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

pub use belongings::{
    AddItemTool, GetAllItemsTool, GetContainerTool, MoveItemTool, RemoveItemTool, SearchItemTool,
    UpdateContainerInfoTool,
};

/// Instructions advertised to agents during MCP initialization.
pub const SERVER_INSTRUCTIONS: &str = "Track items in containers across various locations. \
Use commands to search, add, remove, and move items between containers.";

/// Inventory text when no container holds any item.
pub const EMPTY_INVENTORY_TEXT: &str = "No containers hold any items";

pub(crate) fn text_success(text: impl Into<String>) -> CallToolResult {
    CallToolResult::success(vec![Content::text(text.into())])
}

pub(crate) fn text_error(text: impl Into<String>) -> CallToolResult {
    CallToolResult::error(vec![Content::text(text.into())])
}

/// Maps a repository failure to an error result.
pub(crate) fn repo_error_result(err: &RepoError) -> CallToolResult {
    text_error(format!("Storage error: {err}"))
}

/// One agent-invokable action.
#[async_trait]
pub trait BelongingsTool: Send + Sync {
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    /// JSON schema of the arguments object.
    fn schema(&self) -> Value;

    async fn execute(
        &self,
        arguments: Map<String, Value>,
        service: &SqliteBelongingsService,
    ) -> CallToolResult;
}

/// Name-indexed set of tools.
#[derive(Default)]
pub struct ToolRegistry {
    tools: BTreeMap<&'static str, Box<dyn BelongingsTool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every store operation.
    pub fn with_belongings_tools() -> Self {
        let mut registry = Self::new();
        registry.register(AddItemTool);
        registry.register(RemoveItemTool);
        registry.register(MoveItemTool);
        registry.register(SearchItemTool);
        registry.register(GetAllItemsTool);
        registry.register(UpdateContainerInfoTool);
        registry.register(GetContainerTool);
        registry
    }

    pub fn register<T: BelongingsTool + 'static>(&mut self, tool: T) {
        self.tools.insert(tool.name(), Box::new(tool));
    }

    pub fn get_tool(&self, name: &str) -> Option<&dyn BelongingsTool> {
        self.tools.get(name).map(|tool| tool.as_ref())
    }

    /// MCP tool definitions sorted by tool name.
    pub fn list_tools(&self) -> Vec<Tool> {
        self.tools
            .values()
            .map(|tool| {
                let input_schema = match tool.schema() {
                    Value::Object(map) => map,
                    _ => Map::new(),
                };
                Tool {
                    name: tool.name().into(),
                    title: None,
                    description: Some(tool.description().into()),
                    input_schema: Arc::new(input_schema),
                    output_schema: None,
                    annotations: None,
                    icons: None,
                }
            })
            .collect()
    }

    /// Invokes a tool by name. Unknown names yield an error result.
    pub async fn call(
        &self,
        name: &str,
        arguments: Map<String, Value>,
        service: &SqliteBelongingsService,
    ) -> CallToolResult {
        match self.get_tool(name) {
            Some(tool) => tool.execute(arguments, service).await,
            None => text_error(format!("Unknown tool: {name}")),
        }
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

/// Parses a tool's arguments object into its typed request.
pub(crate) fn parse_arguments<T: DeserializeOwned>(
    arguments: Map<String, Value>,
) -> Result<T, CallToolResult> {
    serde_json::from_value(Value::Object(arguments))
        .map_err(|err| text_error(format!("Invalid arguments: {err}")))
}

/// First text block of a result; empty when the result carries no text.
pub fn result_text(result: &CallToolResult) -> String {
    result
        .content
        .iter()
        .filter_map(|content| content.as_text())
        .map(|text| text.text.clone())
        .next()
        .unwrap_or_default()
}

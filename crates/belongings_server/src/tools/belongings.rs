use super::{
    parse_arguments, repo_error_result, text_error, text_success, BelongingsTool,
    EMPTY_INVENTORY_TEXT,
};
use async_trait::async_trait;
use belongings_core::{
    render_inventory, ContainerInfoUpdate, RepoResult, SqliteBelongingsService, StoreOutcome,
};
use rmcp::model::CallToolResult;
use serde::Deserialize;
use serde_json::{json, Map, Value};

#[derive(Debug, Deserialize)]
struct ContainerItemArgs {
    container_id: String,
    item: String,
}

#[derive(Debug, Deserialize)]
struct MoveItemArgs {
    from_container_id: String,
    to_container_id: String,
    item: String,
}

#[derive(Debug, Deserialize)]
struct ItemArgs {
    item: String,
}

#[derive(Debug, Deserialize)]
struct ContainerArgs {
    container_id: String,
}

#[derive(Debug, Deserialize)]
struct UpdateInfoArgs {
    container_id: String,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    container_name: Option<String>,
}

fn outcome_result(outcome: StoreOutcome) -> CallToolResult {
    if outcome.is_failure() {
        text_error(outcome.to_string())
    } else {
        text_success(outcome.to_string())
    }
}

fn mutation_result(result: RepoResult<StoreOutcome>) -> CallToolResult {
    match result {
        Ok(outcome) => outcome_result(outcome),
        Err(err) => repo_error_result(&err),
    }
}

fn container_item_schema(container_description: &str) -> Value {
    json!({
        "type": "object",
        "properties": {
            "container_id": {
                "type": "string",
                "description": container_description
            },
            "item": {
                "type": "string",
                "description": "Exact item name"
            }
        },
        "required": ["container_id", "item"]
    })
}

pub struct AddItemTool;

#[async_trait]
impl BelongingsTool for AddItemTool {
    fn name(&self) -> &'static str {
        "add_item"
    }

    fn description(&self) -> &'static str {
        "Add an item to a container. If the container doesn't exist, create it."
    }

    fn schema(&self) -> Value {
        container_item_schema("Container to add the item to; created when unknown")
    }

    async fn execute(
        &self,
        arguments: Map<String, Value>,
        service: &SqliteBelongingsService,
    ) -> CallToolResult {
        match parse_arguments::<ContainerItemArgs>(arguments) {
            Ok(args) => {
                mutation_result(service.add_item(&args.container_id, &args.item).await)
            }
            Err(result) => result,
        }
    }
}

pub struct RemoveItemTool;

#[async_trait]
impl BelongingsTool for RemoveItemTool {
    fn name(&self) -> &'static str {
        "remove_item"
    }

    fn description(&self) -> &'static str {
        "Remove an item from a container. Only the first matching entry is removed."
    }

    fn schema(&self) -> Value {
        container_item_schema("Container holding the item")
    }

    async fn execute(
        &self,
        arguments: Map<String, Value>,
        service: &SqliteBelongingsService,
    ) -> CallToolResult {
        match parse_arguments::<ContainerItemArgs>(arguments) {
            Ok(args) => {
                mutation_result(service.remove_item(&args.container_id, &args.item).await)
            }
            Err(result) => result,
        }
    }
}

pub struct MoveItemTool;

#[async_trait]
impl BelongingsTool for MoveItemTool {
    fn name(&self) -> &'static str {
        "move_item"
    }

    fn description(&self) -> &'static str {
        "Move an item from one container to another."
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "from_container_id": {
                    "type": "string",
                    "description": "Container currently holding the item"
                },
                "to_container_id": {
                    "type": "string",
                    "description": "Destination container; created when unknown"
                },
                "item": {
                    "type": "string",
                    "description": "Exact item name"
                }
            },
            "required": ["from_container_id", "to_container_id", "item"]
        })
    }

    async fn execute(
        &self,
        arguments: Map<String, Value>,
        service: &SqliteBelongingsService,
    ) -> CallToolResult {
        match parse_arguments::<MoveItemArgs>(arguments) {
            Ok(args) => mutation_result(
                service
                    .move_item(&args.from_container_id, &args.to_container_id, &args.item)
                    .await,
            ),
            Err(result) => result,
        }
    }
}

pub struct SearchItemTool;

#[async_trait]
impl BelongingsTool for SearchItemTool {
    fn name(&self) -> &'static str {
        "search_item"
    }

    fn description(&self) -> &'static str {
        "Search for an item across all containers."
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "item": {
                    "type": "string",
                    "description": "Exact item name to look for"
                }
            },
            "required": ["item"]
        })
    }

    async fn execute(
        &self,
        arguments: Map<String, Value>,
        service: &SqliteBelongingsService,
    ) -> CallToolResult {
        let args = match parse_arguments::<ItemArgs>(arguments) {
            Ok(args) => args,
            Err(result) => return result,
        };
        match service.search_item(&args.item).await {
            Ok(search) => text_success(search.to_string()),
            Err(err) => repo_error_result(&err),
        }
    }
}

pub struct GetAllItemsTool;

#[async_trait]
impl BelongingsTool for GetAllItemsTool {
    fn name(&self) -> &'static str {
        "get_all_items"
    }

    fn description(&self) -> &'static str {
        "Get all items from all containers, one line per non-empty container."
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {},
            "required": []
        })
    }

    async fn execute(
        &self,
        _arguments: Map<String, Value>,
        service: &SqliteBelongingsService,
    ) -> CallToolResult {
        match service.list_all_containers().await {
            Ok(containers) if containers.is_empty() => {
                text_success(EMPTY_INVENTORY_TEXT)
            }
            Ok(containers) => text_success(render_inventory(&containers)),
            Err(err) => repo_error_result(&err),
        }
    }
}

pub struct UpdateContainerInfoTool;

#[async_trait]
impl BelongingsTool for UpdateContainerInfoTool {
    fn name(&self) -> &'static str {
        "update_container_info"
    }

    fn description(&self) -> &'static str {
        "Update container location or name. Omitted fields are left unchanged."
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "container_id": {
                    "type": "string",
                    "description": "Existing container to annotate"
                },
                "location": {
                    "type": "string",
                    "description": "Where the container is kept"
                },
                "container_name": {
                    "type": "string",
                    "description": "Display name for the container"
                }
            },
            "required": ["container_id"]
        })
    }

    async fn execute(
        &self,
        arguments: Map<String, Value>,
        service: &SqliteBelongingsService,
    ) -> CallToolResult {
        let args = match parse_arguments::<UpdateInfoArgs>(arguments) {
            Ok(args) => args,
            Err(result) => return result,
        };
        let update = ContainerInfoUpdate {
            location: args.location,
            name: args.container_name,
        };
        mutation_result(
            service
                .update_container_info(&args.container_id, &update)
                .await,
        )
    }
}

pub struct GetContainerTool;

#[async_trait]
impl BelongingsTool for GetContainerTool {
    fn name(&self) -> &'static str {
        "get_container"
    }

    fn description(&self) -> &'static str {
        "Show one container's location, name and contents, even when empty."
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "container_id": {
                    "type": "string",
                    "description": "Container to show"
                }
            },
            "required": ["container_id"]
        })
    }

    async fn execute(
        &self,
        arguments: Map<String, Value>,
        service: &SqliteBelongingsService,
    ) -> CallToolResult {
        let args = match parse_arguments::<ContainerArgs>(arguments) {
            Ok(args) => args,
            Err(result) => return result,
        };
        match service.get_container(&args.container_id).await {
            Ok(Some(container)) => text_success(container.describe()),
            Ok(None) => text_error(
                StoreOutcome::ContainerNotFound {
                    container_id: args.container_id,
                }
                .to_string(),
            ),
            Err(err) => repo_error_result(&err),
        }
    }
}

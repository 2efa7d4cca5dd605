use crate::error::Result;
use crate::llm::tools::{LlmTool, ToolDescriptor};
use crate::store::{Inventory, InventoryQuery};
use crate::validation::{validate, ToolOutcome};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::warn;

/// Tool for looking up the current inventory, optionally filtered by product type
pub struct GetInventoryTool {
    inventory: Arc<Inventory>,
}

impl GetInventoryTool {
    pub fn new(inventory: Arc<Inventory>) -> Self {
        Self { inventory }
    }
}

impl LlmTool for GetInventoryTool {
    fn run(&self, args: &Value) -> Result<Value> {
        let outcome = match validate::<InventoryQuery>(args) {
            Ok(query) => ToolOutcome::success(json!({
                "inventory": self.inventory.list(query.product_type)
            })),
            Err(e) => {
                warn!(error = %e, "Invalid inventory query");
                e.into()
            }
        };
        Ok(outcome.into_value())
    }

    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::function::<InventoryQuery>("getInventory", "Get the current inventory")
    }
}

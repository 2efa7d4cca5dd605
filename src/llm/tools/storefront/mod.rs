//! The storefront capability table: inventory lookup and order management.

mod create_order;
mod get_inventory;
mod get_orders;

pub use create_order::CreateOrderTool;
pub use get_inventory::GetInventoryTool;
pub use get_orders::GetOrdersTool;

use crate::llm::tools::LlmTool;
use crate::store::{Inventory, OrderBook};
use std::sync::Arc;

/// Creates the storefront tools over the shared stores
///
/// The table is handed to the broker as-is; the model decides when each tool
/// runs.
///
/// # Examples
///
/// ```ignore
/// use storefront_chat::llm::tools::storefront::all_tools;
/// use storefront_chat::store::{Inventory, OrderBook};
/// use std::sync::Arc;
///
/// let tools = all_tools(Arc::new(Inventory::seeded()), Arc::new(OrderBook::new()));
/// ```
pub fn all_tools(inventory: Arc<Inventory>, orders: Arc<OrderBook>) -> Vec<Box<dyn LlmTool>> {
    vec![
        Box::new(CreateOrderTool::new(Arc::clone(&orders))),
        Box::new(GetOrdersTool::new(orders)),
        Box::new(GetInventoryTool::new(inventory)),
    ]
}

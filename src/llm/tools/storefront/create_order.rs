use crate::error::Result;
use crate::llm::tools::{LlmTool, ToolDescriptor};
use crate::store::{CreateOrderRequest, OrderBook};
use crate::validation::{validate, ToolOutcome};
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

/// Tool for placing a gloves, hats or scarves order
///
/// Arguments are validated in full before the order book is touched, so a
/// rejected call never changes the stored orders.
pub struct CreateOrderTool {
    orders: Arc<OrderBook>,
}

impl CreateOrderTool {
    pub fn new(orders: Arc<OrderBook>) -> Self {
        Self { orders }
    }
}

impl LlmTool for CreateOrderTool {
    fn run(&self, args: &Value) -> Result<Value> {
        let outcome = match validate::<CreateOrderRequest>(args) {
            Ok(CreateOrderRequest { order }) => {
                info!(
                    quantity = order.quantity(),
                    delivery_date = order.delivery_date(),
                    shipping = ?order.shipping(),
                    "Creating order"
                );
                self.orders.append(order);
                ToolOutcome::ok()
            }
            Err(e) => {
                warn!(error = %e, "Invalid order");
                e.into()
            }
        };
        Ok(outcome.into_value())
    }

    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::function::<CreateOrderRequest>("createOrder", "Create an order")
    }
}

use crate::error::Result;
use crate::llm::tools::{LlmTool, ToolDescriptor};
use crate::store::{OrderBook, OrdersQuery};
use crate::validation::{validate, ToolOutcome};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::warn;

/// Tool for listing placed orders
pub struct GetOrdersTool {
    orders: Arc<OrderBook>,
}

impl GetOrdersTool {
    pub fn new(orders: Arc<OrderBook>) -> Self {
        Self { orders }
    }
}

impl LlmTool for GetOrdersTool {
    fn run(&self, args: &Value) -> Result<Value> {
        let outcome = match validate::<OrdersQuery>(args) {
            Ok(query) => ToolOutcome::success(json!({ "orders": self.orders.list(query.limit()) })),
            Err(e) => {
                warn!(error = %e, "Invalid orders query");
                e.into()
            }
        };
        Ok(outcome.into_value())
    }

    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::function::<OrdersQuery>("getOrders", "Get all orders")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{HatOrder, HatVariant, Order, Shipping};

    fn book_with(count: u32) -> Arc<OrderBook> {
        let book = Arc::new(OrderBook::new());
        for quantity in 0..count {
            book.append(Order::Hats(HatOrder {
                quantity: f64::from(quantity),
                variants: HatVariant::Cap,
                delivery_date: "2025-04-15".to_string(),
                shipping: Shipping::Express,
            }));
        }
        book
    }

    #[test]
    fn test_default_limit_is_ten() {
        let tool = GetOrdersTool::new(book_with(15));

        let result = tool.run(&json!({})).unwrap();

        assert_eq!(result["success"], true);
        assert_eq!(result["orders"].as_array().unwrap().len(), 10);
    }

    #[test]
    fn test_explicit_limit() {
        let tool = GetOrdersTool::new(book_with(5));

        let result = tool.run(&json!({"number": 2})).unwrap();

        let orders = result["orders"].as_array().unwrap();
        assert_eq!(orders.len(), 2);
        assert_eq!(orders[0]["quantity"], 0.0);
        assert_eq!(orders[1]["kind"], "hats");
    }

    #[test]
    fn test_zero_limit() {
        let tool = GetOrdersTool::new(book_with(3));

        let result = tool.run(&json!({"number": 0})).unwrap();

        assert_eq!(result["orders"], json!([]));
    }

    #[test]
    fn test_negative_limit_lists_nothing() {
        let tool = GetOrdersTool::new(book_with(3));

        let result = tool.run(&json!({"number": -1})).unwrap();

        assert_eq!(result["success"], true);
        assert_eq!(result["orders"], json!([]));
    }

    #[test]
    fn test_float_limit() {
        let tool = GetOrdersTool::new(book_with(8));

        let result = tool.run(&json!({"number": 5.0})).unwrap();

        assert_eq!(result["success"], true);
        assert_eq!(result["orders"].as_array().unwrap().len(), 5);
    }

    #[test]
    fn test_non_numeric_limit_is_rejected() {
        let tool = GetOrdersTool::new(book_with(3));

        let result = tool.run(&json!({"number": "five"})).unwrap();

        assert_eq!(result["success"], false);
    }
}

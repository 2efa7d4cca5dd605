use parking_lot::Mutex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Shipping {
    Normal,
    Express,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum GloveUnit {
    Boxes,
    Pairs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum HatVariant {
    Top,
    Beanie,
    Cap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ScarfColor {
    Red,
    Blue,
    Green,
    Yellow,
    Purple,
    Orange,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GloveOrder {
    pub quantity: f64,
    pub unit: GloveUnit,
    pub delivery_date: String,
    pub shipping: Shipping,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct HatOrder {
    pub quantity: f64,
    pub variants: HatVariant,
    pub delivery_date: String,
    pub shipping: Shipping,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScarfOrder {
    pub quantity: f64,
    pub colors: ScarfColor,
    pub delivery_date: String,
    pub shipping: Shipping,
}

/// An order, discriminated on the wire by `kind`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Order {
    Gloves(GloveOrder),
    Hats(HatOrder),
    Scarves(ScarfOrder),
}

impl Order {
    pub fn quantity(&self) -> f64 {
        match self {
            Order::Gloves(o) => o.quantity,
            Order::Hats(o) => o.quantity,
            Order::Scarves(o) => o.quantity,
        }
    }

    pub fn delivery_date(&self) -> &str {
        match self {
            Order::Gloves(o) => &o.delivery_date,
            Order::Hats(o) => &o.delivery_date,
            Order::Scarves(o) => &o.delivery_date,
        }
    }

    pub fn shipping(&self) -> Shipping {
        match self {
            Order::Gloves(o) => o.shipping,
            Order::Hats(o) => o.shipping,
            Order::Scarves(o) => o.shipping,
        }
    }
}

/// Arguments accepted by order creation
#[derive(Debug, Clone, PartialEq, Deserialize, JsonSchema)]
pub struct CreateOrderRequest {
    pub order: Order,
}

/// Arguments accepted by order listing
#[derive(Debug, Clone, PartialEq, Deserialize, JsonSchema)]
pub struct OrdersQuery {
    /// Maximum number of orders to return
    #[serde(default = "default_order_limit")]
    pub number: f64,
}

impl OrdersQuery {
    /// `number` as a list length: fractions round down, negatives and NaN give 0
    pub fn limit(&self) -> usize {
        if self.number.is_nan() || self.number <= 0.0 {
            0
        } else {
            self.number.floor() as usize
        }
    }
}

impl Default for OrdersQuery {
    fn default() -> Self {
        Self {
            number: default_order_limit(),
        }
    }
}

fn default_order_limit() -> f64 {
    10.0
}

/// Append-only, process-lifetime order list
#[derive(Debug, Default)]
pub struct OrderBook {
    orders: Mutex<Vec<Order>>,
}

impl OrderBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push `order` to the end of the book
    pub fn append(&self, order: Order) {
        self.orders.lock().push(order);
    }

    /// The first `limit` orders in insertion order
    ///
    /// This is earliest-first, not most-recent-first.
    pub fn list(&self, limit: usize) -> Vec<Order> {
        self.orders.lock().iter().take(limit).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.orders.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn glove_order(quantity: f64) -> Order {
        Order::Gloves(GloveOrder {
            quantity,
            unit: GloveUnit::Pairs,
            delivery_date: "2025-04-20".to_string(),
            shipping: Shipping::Normal,
        })
    }

    #[test]
    fn test_append_then_list_keeps_insertion_position() {
        let book = OrderBook::new();
        book.append(glove_order(1.0));
        book.append(glove_order(2.0));
        book.append(glove_order(3.0));

        for n in 1..=5 {
            let listed = book.list(n);
            assert_eq!(listed.len(), n.min(3));
            for (idx, order) in listed.iter().enumerate() {
                assert_eq!(order.quantity(), idx as f64 + 1.0);
            }
        }
    }

    #[test]
    fn test_list_zero_is_empty() {
        let book = OrderBook::new();
        book.append(glove_order(1.0));
        assert!(book.list(0).is_empty());
    }

    #[test]
    fn test_list_returns_earliest_orders() {
        let book = OrderBook::new();
        for q in 0..12 {
            book.append(glove_order(f64::from(q)));
        }

        let listed = book.list(OrdersQuery::default().limit());
        assert_eq!(listed.len(), 10);
        assert_eq!(listed[0].quantity(), 0.0);
        assert_eq!(listed[9].quantity(), 9.0);
    }

    #[test]
    fn test_order_deserializes_by_kind() {
        let order: Order = serde_json::from_value(json!({
            "kind": "hats",
            "quantity": 4,
            "variants": "beanie",
            "deliveryDate": "2025-04-15",
            "shipping": "express"
        }))
        .unwrap();

        match &order {
            Order::Hats(hat) => assert_eq!(hat.variants, HatVariant::Beanie),
            other => panic!("expected hat order, got {:?}", other),
        }
        assert_eq!(order.shipping(), Shipping::Express);
        assert_eq!(order.delivery_date(), "2025-04-15");
    }

    #[test]
    fn test_order_requires_fields_of_its_kind() {
        let result = serde_json::from_value::<Order>(json!({
            "kind": "scarves",
            "quantity": 1,
            "unit": "boxes",
            "deliveryDate": "2025-04-15",
            "shipping": "normal"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_order_serializes_with_kind_tag() {
        let json = serde_json::to_value(glove_order(10.0)).unwrap();
        assert_eq!(
            json,
            json!({
                "kind": "gloves",
                "quantity": 10.0,
                "unit": "pairs",
                "deliveryDate": "2025-04-20",
                "shipping": "normal"
            })
        );
    }

    #[test]
    fn test_orders_query_default() {
        let query: OrdersQuery = serde_json::from_value(json!({})).unwrap();
        assert_eq!(query.number, 10.0);
        assert_eq!(query.limit(), 10);
    }

    #[test]
    fn test_order_accepts_float_quantities() {
        for quantity in [json!(2), json!(2.0), json!(2.5)] {
            let order: Order = serde_json::from_value(json!({
                "kind": "scarves",
                "quantity": quantity,
                "colors": "red",
                "deliveryDate": "2025-04-15",
                "shipping": "normal"
            }))
            .unwrap();
            assert_eq!(order.quantity(), quantity.as_f64().unwrap());
        }
    }

    #[test]
    fn test_orders_query_limit_accepts_any_number() {
        let limit = |number: serde_json::Value| {
            serde_json::from_value::<OrdersQuery>(json!({ "number": number }))
                .unwrap()
                .limit()
        };

        assert_eq!(limit(json!(5)), 5);
        assert_eq!(limit(json!(5.0)), 5);
        assert_eq!(limit(json!(2.7)), 2);
        assert_eq!(limit(json!(0)), 0);
        assert_eq!(limit(json!(-3)), 0);
    }
}

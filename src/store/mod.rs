//! In-memory mock stores backing the storefront tools.

pub mod inventory;
pub mod orders;

pub use inventory::{Inventory, InventoryItem, InventoryQuery, ProductFilter, ProductType};
pub use orders::{
    CreateOrderRequest, GloveOrder, GloveUnit, HatOrder, HatVariant, Order, OrderBook, OrdersQuery,
    ScarfColor, ScarfOrder, Shipping,
};

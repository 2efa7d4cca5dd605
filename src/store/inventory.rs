use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Kinds of product the shop carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ProductType {
    Gloves,
    Hats,
    Scarves,
}

/// Inventory filter: a single product type, or everything
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ProductFilter {
    Gloves,
    Hats,
    Scarves,
    #[default]
    All,
}

impl ProductFilter {
    pub fn matches(self, product_type: ProductType) -> bool {
        match self {
            ProductFilter::All => true,
            ProductFilter::Gloves => product_type == ProductType::Gloves,
            ProductFilter::Hats => product_type == ProductType::Hats,
            ProductFilter::Scarves => product_type == ProductType::Scarves,
        }
    }
}

/// Arguments accepted by the inventory lookup
#[derive(Debug, Clone, Default, PartialEq, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct InventoryQuery {
    #[serde(default)]
    pub product_type: ProductFilter,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub product_type: ProductType,
    pub quantity: u32,
    #[serde(rename = "priceInUSD")]
    pub price_in_usd: f64,
    pub urgent_delivery_date: NaiveDate,
    pub normal_delivery_date: NaiveDate,
    pub image_src: String,
}

/// Read-only product catalog, seeded once at startup
#[derive(Debug, Clone)]
pub struct Inventory {
    items: Vec<InventoryItem>,
}

impl Inventory {
    /// The fixed three-item catalog
    pub fn seeded() -> Self {
        let urgent = NaiveDate::from_ymd_opt(2025, 4, 15).unwrap_or(NaiveDate::MIN);
        let normal = NaiveDate::from_ymd_opt(2025, 4, 20).unwrap_or(NaiveDate::MIN);
        let item = |product_type, quantity, price_in_usd, image_src: &str| InventoryItem {
            product_type,
            quantity,
            price_in_usd,
            urgent_delivery_date: urgent,
            normal_delivery_date: normal,
            image_src: image_src.to_string(),
        };

        Self {
            items: vec![
                item(
                    ProductType::Gloves,
                    100,
                    10.0,
                    "https://images.unsplash.com/photo-1617118602199-d3c05ae37ed8",
                ),
                item(
                    ProductType::Hats,
                    200,
                    15.0,
                    "https://images.unsplash.com/photo-1556306535-0f09a537f0a3",
                ),
                item(
                    ProductType::Scarves,
                    300,
                    5.0,
                    "https://images.unsplash.com/photo-1457545195570-67f207084966",
                ),
            ],
        }
    }

    /// Copy of every catalog entry matching `filter`, in catalog order
    pub fn list(&self, filter: ProductFilter) -> Vec<InventoryItem> {
        self.items.iter().filter(|item| filter.matches(item.product_type)).cloned().collect()
    }
}

impl Default for Inventory {
    fn default() -> Self {
        Self::seeded()
    }
}

//! # Warehouse Data Model
//!
//! This module defines the records exchanged with the warehouse REST service:
//! products, the category-specific attribute records, and the request bodies
//! for stock and reservation changes.
//!
//! ## Core Concepts
//!
//! - **Product**: A catalog entry owned by the warehouse service
//! - **ProductCategory**: The resolved category of a product (thermocups, servers, or anything else)
//! - **CategoryAttributes**: The extension record that belongs to the product's category
//!
//! ## Usage
//!
//! ```rust
//! use warehouse_bot::warehouse_model::{Product, ProductCategory};
//!
//! let product = Product {
//!     id: Some(42),
//!     name: "Premium Thermo".to_string(),
//!     category_id: Some(1),
//!     ..Default::default()
//! };
//! assert_eq!(product.category(), ProductCategory::Thermocups);
//! ```

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Category id the warehouse service assigns to thermal mugs
pub const THERMOCUP_CATEGORY_ID: i32 = 1;
/// Category id the warehouse service assigns to servers
pub const SERVER_CATEGORY_ID: i32 = 2;

/// A product record as served by `GET /products/{id}`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Product {
    /// Identifier assigned by the warehouse service (absent before creation)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,

    #[serde(deserialize_with = "null_as_default")]
    pub name: String,

    /// Numeric category (1 = thermocups, 2 = servers)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i32>,

    /// Human readable category label, when the service sends one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,

    #[serde(deserialize_with = "null_as_default")]
    pub base_price: f64,

    #[serde(deserialize_with = "null_as_default")]
    pub is_active: bool,

    /// Units currently in stock across warehouses
    #[serde(alias = "stock_quantity", deserialize_with = "null_as_default")]
    pub quantity: i64,

    /// Units reserved for pending orders
    #[serde(deserialize_with = "null_as_default")]
    pub num_reserved_goods: i64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub path_to_photo: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<NaiveDateTime>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<NaiveDateTime>,
}

/// Resolved category of a product
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProductCategory {
    Thermocups,
    Servers,
    /// Any category the bot has no attribute schema for, carrying its raw label
    Other(String),
}

impl ProductCategory {
    /// Display label used by the formatter
    pub fn label(&self) -> &str {
        match self {
            ProductCategory::Thermocups => "Thermocups",
            ProductCategory::Servers => "Servers",
            ProductCategory::Other(label) => label,
        }
    }
}

impl fmt::Display for ProductCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Product {
    /// Resolve the product's category.
    ///
    /// A category label sent by the service wins over the numeric id; the
    /// id is only consulted when no label is present.
    pub fn category(&self) -> ProductCategory {
        if let Some(label) = self.category.as_deref().map(str::trim).filter(|l| !l.is_empty()) {
            return match label.to_lowercase().as_str() {
                "thermocups" | "thermocup" | "thermal mugs" | "thermal mug" => {
                    ProductCategory::Thermocups
                }
                "servers" | "server" => ProductCategory::Servers,
                _ => ProductCategory::Other(label.to_string()),
            };
        }

        match self.category_id {
            Some(THERMOCUP_CATEGORY_ID) => ProductCategory::Thermocups,
            Some(SERVER_CATEGORY_ID) => ProductCategory::Servers,
            Some(other) => ProductCategory::Other(format!("Category #{other}")),
            None => ProductCategory::Other("Uncategorized".to_string()),
        }
    }
}

/// Thermal mug extension record (`/products/thermocups/{id}`)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ThermocupAttributes {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_id: Option<i64>,
    #[serde(deserialize_with = "null_as_default")]
    pub volume_ml: i32,
    #[serde(deserialize_with = "null_as_default")]
    pub color: String,
    #[serde(deserialize_with = "null_as_default")]
    pub brand: String,
    #[serde(deserialize_with = "null_as_default")]
    pub model: String,
    #[serde(deserialize_with = "null_as_default")]
    pub is_hermetic: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub material: String,
}

/// Server extension record (`/products/servers/{id}`)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerAttributes {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_id: Option<i64>,
    #[serde(deserialize_with = "null_as_default")]
    pub ram_gb: i32,
    #[serde(deserialize_with = "null_as_default")]
    pub cpu_model: String,
    #[serde(deserialize_with = "null_as_default")]
    pub cpu_cores: i32,
    #[serde(deserialize_with = "null_as_default")]
    pub hdd_size_gb: i32,
    #[serde(deserialize_with = "null_as_default")]
    pub ssd_size_gb: i32,
    /// "Rack", "Tower" or "Blade"
    #[serde(deserialize_with = "null_as_default")]
    pub form_factor: String,
    #[serde(deserialize_with = "null_as_default")]
    pub manufacturer: String,
}

/// Category-specific attributes of a product
#[derive(Debug, Clone, PartialEq)]
pub enum CategoryAttributes {
    Thermocup(ThermocupAttributes),
    Server(ServerAttributes),
    /// No attribute schema exists for this category; only the label is known
    Unknown(String),
}

/// A thermal mug parsed from user input, not yet created remotely.
///
/// Serializes as the product fields plus a nested `attributes` object,
/// the body of `PUT /products/thermocups/update/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewThermocup {
    #[serde(flatten)]
    pub product: Product,
    pub attributes: ThermocupAttributes,
}

/// Body of `PATCH /products/thermocups/update/{id}/stock`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockChange {
    pub warehouse_id: i64,
    pub quantity_change: i32,
}

/// Body of `PATCH /products/thermocups/update/{id}/reserved`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReservedChange {
    pub quantity_change: i32,
}

/// Query filters for `GET /products`, kept in the order the user typed them
pub type ProductFilters = Vec<(String, String)>;

/// Reads an explicit JSON `null` as the field's default value
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

//! # Cart Types
//!
//! Line items and the cart as returned by the Cart Store.
//! Line totals are authoritative server data and are never recomputed here.

use crate::money::{null_as_default, Amount};
use serde::{Deserialize, Serialize};

/// A product or colour variant reference.
///
/// The Cart Store populates these as `{ "_id", "name" }` objects, but a bare
/// id string is accepted as well.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(untagged)]
enum Reference {
    Populated {
        #[serde(rename = "_id", default)]
        id: String,
        #[serde(default)]
        name: Option<String>,
    },
    Id(String),
    #[default]
    Missing,
}

impl Reference {
    fn into_parts(self) -> (String, Option<String>) {
        match self {
            Reference::Populated { id, name } => (id, name),
            Reference::Id(id) => (id, None),
            Reference::Missing => (String::new(), None),
        }
    }
}

#[derive(Debug, Deserialize)]
struct LineItemWire {
    #[serde(rename = "_id", default)]
    id: Option<String>,
    #[serde(rename = "productId", default, deserialize_with = "null_as_default")]
    product: Reference,
    #[serde(rename = "productColorId", default, deserialize_with = "null_as_default")]
    color: Reference,
    #[serde(default, deserialize_with = "null_as_default")]
    price: Amount,
    #[serde(default, deserialize_with = "null_as_default")]
    quantity: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    total: Amount,
}

/// One product-colour-quantity entry in a cart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "LineItemWire")]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    /// Cart entry ID (if the store exposes it)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_id: Option<String>,

    /// Product ID
    pub product_id: String,

    /// Product name (denormalized for display)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,

    /// Colour variant ID; also the line reference for update/remove
    pub color_variant_id: String,

    /// Colour variant name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_name: Option<String>,

    /// Unit price
    pub unit_price: Amount,

    /// Quantity
    pub quantity: u32,

    /// Line total as reported by the Cart Store
    pub line_total: Amount,
}

impl From<LineItemWire> for LineItem {
    fn from(wire: LineItemWire) -> Self {
        let (product_id, product_name) = wire.product.into_parts();
        let (color_variant_id, color_name) = wire.color.into_parts();
        Self {
            line_id: wire.id,
            product_id,
            product_name,
            color_variant_id,
            color_name,
            unit_price: wire.price,
            quantity: wire.quantity,
            line_total: wire.total,
        }
    }
}

impl LineItem {
    /// Create a line item (line total supplied by the caller, as the store would)
    pub fn new(
        product_id: impl Into<String>,
        color_variant_id: impl Into<String>,
        unit_price: Amount,
        quantity: u32,
        line_total: Amount,
    ) -> Self {
        Self {
            line_id: None,
            product_id: product_id.into(),
            product_name: None,
            color_variant_id: color_variant_id.into(),
            color_name: None,
            unit_price,
            quantity,
            line_total,
        }
    }

    /// Builder: set display names
    pub fn with_names(mut self, product: impl Into<String>, color: impl Into<String>) -> Self {
        self.product_name = Some(product.into());
        self.color_name = Some(color.into());
        self
    }

    /// Reference used by the Cart Store for update/remove
    pub fn line_ref(&self) -> &str {
        &self.color_variant_id
    }

    /// Name shown on receipts, e.g. "Sofa Grey"
    pub fn display_name(&self) -> String {
        match (&self.product_name, &self.color_name) {
            (Some(product), Some(color)) => format!("{} {}", product, color),
            (Some(product), None) => product.clone(),
            (None, Some(color)) => color.clone(),
            (None, None) => self.product_id.clone(),
        }
    }

    /// Quantity after one "+" press
    pub fn incremented_quantity(&self) -> u32 {
        self.quantity.saturating_add(1)
    }

    /// Quantity after one "-" press; never below 1
    pub fn decremented_quantity(&self) -> u32 {
        floor_quantity(self.quantity.saturating_sub(1))
    }
}

/// Clamp a requested quantity to the minimum of one unit
pub fn floor_quantity(quantity: u32) -> u32 {
    quantity.max(1)
}

#[derive(Debug, Default, Deserialize)]
struct CartRefWire {
    #[serde(rename = "_id", alias = "id", default)]
    id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct CartWire {
    #[serde(default, deserialize_with = "null_as_default")]
    cart: CartRefWire,
    #[serde(default, deserialize_with = "null_as_default")]
    items: Vec<LineItem>,
}

/// A customer's cart
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "CartWire")]
pub struct Cart {
    /// Cart ID; `None` until loaded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Line items, in store order
    pub items: Vec<LineItem>,
}

impl From<CartWire> for Cart {
    fn from(wire: CartWire) -> Self {
        Self {
            id: wire.cart.id,
            items: wire.items,
        }
    }
}

impl Cart {
    /// The unloaded (or cleared) cart
    pub fn empty() -> Self {
        Self::default()
    }

    /// Create a loaded cart
    pub fn new(id: impl Into<String>, items: Vec<LineItem>) -> Self {
        Self {
            id: Some(id.into()),
            items,
        }
    }

    /// Check if cart has no lines
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of distinct lines (the header badge count)
    pub fn line_count(&self) -> usize {
        self.items.len()
    }

    /// Total units across all lines
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Find a line by its reference
    pub fn find(&self, line_ref: &str) -> Option<&LineItem> {
        self.items.iter().find(|i| i.line_ref() == line_ref)
    }
}

use serde::{Deserialize, Serialize};

use super::{Category, InventoryItem};

/// A cart line, bound to one catalog item at add time.
///
/// `name`, `category` and `base_price` are copied from the source item
/// when the line is created so the cart stays renderable even if the
/// catalog entry is later edited or removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShoppingListItem {
    pub id: String,
    pub inventory_item_id: String,
    pub name: String,
    pub category: Category,
    pub base_price: f64,
    pub quantity: i64,
    pub purchased: bool,
    #[serde(default, skip_serializing_if = "PriceOverride::is_unset")]
    pub manual_price: PriceOverride,
    /// Fields this version does not model. Carried through a
    /// read-then-write cycle so rewriting a cache blob never destroys
    /// them.
    #[serde(flatten, default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ShoppingListItem {
    /// Start a new line for an inventory item, quantity 1, unpurchased.
    pub fn for_item(id: String, item: &InventoryItem) -> Self {
        Self {
            id,
            inventory_item_id: item.id.clone(),
            name: item.name.clone(),
            category: item.category,
            base_price: item.base_price,
            quantity: 1,
            purchased: false,
            manual_price: PriceOverride::Unset,
            extra: serde_json::Map::new(),
        }
    }
}

/// A session-scoped observed price layered over the base price.
///
/// This is a sum type rather than a bare `Option` so every consumer is
/// forced to handle the fall-back-to-base-price case. It serializes as
/// an optional number: `Unset` is an absent field, which keeps cache
/// blobs compatible with an optional-column shape.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "Option<f64>", into = "Option<f64>")]
pub enum PriceOverride {
    Observed(f64),
    #[default]
    Unset,
}

impl PriceOverride {
    pub fn is_unset(&self) -> bool {
        matches!(self, PriceOverride::Unset)
    }
}

impl From<Option<f64>> for PriceOverride {
    fn from(v: Option<f64>) -> Self {
        match v {
            Some(p) => PriceOverride::Observed(p),
            None => PriceOverride::Unset,
        }
    }
}

impl From<PriceOverride> for Option<f64> {
    fn from(v: PriceOverride) -> Self {
        match v {
            PriceOverride::Observed(p) => Some(p),
            PriceOverride::Unset => None,
        }
    }
}

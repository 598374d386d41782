//! Data models for the catalog and the shopping list.
//!
//! - `InventoryItem`, `Category`: durable catalog entries
//! - `ShoppingListItem`, `PriceOverride`: transient cart lines with a
//!   session-scoped observed-price layer

pub mod inventory;
pub mod shopping;

pub use inventory::{Category, InventoryItem, NewInventoryItem};
pub use shopping::{PriceOverride, ShoppingListItem};

/// Generate an opaque, globally-unique identifier.
///
/// Ids are generated client-side and reused as the remote primary key
/// so local and remote identity stay identical.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

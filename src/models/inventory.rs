use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A catalog entry: something the user can buy.
///
/// `base_price` is the durable reference price. It is only ever changed
/// by an explicit catalog edit, never by the observed-price path on a
/// cart line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: String,
    pub name: String,
    pub category: Category,
    pub base_price: f64,
    pub created_at: DateTime<Utc>,
    /// Fields this version does not model. Carried through a
    /// read-then-write cycle so rewriting a cache blob never destroys
    /// them.
    #[serde(flatten, default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Fields for an item that does not exist yet; the reconciliation layer
/// supplies the id and timestamp.
#[derive(Debug, Clone, Serialize)]
pub struct NewInventoryItem {
    pub name: String,
    pub category: Category,
    pub base_price: f64,
}

impl InventoryItem {
    /// Materialize a draft into a full record with the given identity.
    pub fn from_draft(draft: &NewInventoryItem, id: String, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            name: draft.name.clone(),
            category: draft.category,
            base_price: draft.base_price,
            created_at,
            extra: serde_json::Map::new(),
        }
    }
}

/// Fixed category set for catalog entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    Produce,
    Dairy,
    Meat,
    Bakery,
    Grocery,
    Household,
    #[serde(rename = "Personal Care")]
    PersonalCare,
    Other,
}

impl Category {
    /// Parse a category string, case-insensitively.
    /// Returns `None` for blank or unrecognized input.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "produce" => Some(Category::Produce),
            "dairy" => Some(Category::Dairy),
            "meat" => Some(Category::Meat),
            "bakery" => Some(Category::Bakery),
            "grocery" => Some(Category::Grocery),
            "household" => Some(Category::Household),
            "personal care" => Some(Category::PersonalCare),
            "other" => Some(Category::Other),
            _ => None,
        }
    }

    /// Lenient variant for remote rows: unknown strings become `Other`
    /// rather than failing the whole fetch.
    pub fn from_remote(s: &str) -> Self {
        Self::from_str(s).unwrap_or(Category::Other)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Produce => "Produce",
            Category::Dairy => "Dairy",
            Category::Meat => "Meat",
            Category::Bakery => "Bakery",
            Category::Grocery => "Grocery",
            Category::Household => "Household",
            Category::PersonalCare => "Personal Care",
            Category::Other => "Other",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_from_str() {
        assert_eq!(Category::from_str("Grocery"), Some(Category::Grocery));
        assert_eq!(Category::from_str("  dairy "), Some(Category::Dairy));
        assert_eq!(Category::from_str("personal care"), Some(Category::PersonalCare));
        assert_eq!(Category::from_str(""), None);
        assert_eq!(Category::from_str("widgets"), None);
    }

    #[test]
    fn test_category_from_remote_falls_back_to_other() {
        assert_eq!(Category::from_remote("Meat"), Category::Meat);
        assert_eq!(Category::from_remote("widgets"), Category::Other);
    }

    #[test]
    fn test_category_serializes_as_display_string() {
        let json = serde_json::to_string(&Category::PersonalCare).unwrap();
        assert_eq!(json, "\"Personal Care\"");
        let back: Category = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Category::PersonalCare);
    }

    #[test]
    fn test_inventory_item_timestamp_round_trips() {
        let item = InventoryItem {
            id: "abc".to_string(),
            name: "Rice".to_string(),
            category: Category::Grocery,
            base_price: 60.0,
            created_at: "2024-03-01T12:00:00Z".parse().unwrap(),
            extra: serde_json::Map::new(),
        };
        let json = serde_json::to_string(&item).unwrap();
        let back: InventoryItem = serde_json::from_str(&json).unwrap();
        assert_eq!(back, item);
    }

    #[test]
    fn test_unrecognized_fields_survive_round_trip() {
        let json = r#"{"id":"abc","name":"Rice","category":"Grocery","base_price":60.0,"created_at":"2024-03-01T12:00:00Z","aisle":"7"}"#;
        let item: InventoryItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.extra.get("aisle"), Some(&serde_json::json!("7")));

        let rewritten = serde_json::to_string(&item).unwrap();
        assert!(rewritten.contains("\"aisle\":\"7\""));
    }
}

//! HTTP client for the hosted relational store.
//!
//! Speaks the PostgREST dialect: two tables, `inventory` (the catalog)
//! and `ledger` (append-only purchase audit). The adapter owns no
//! state; it translates between the local model shape and the remote
//! column schema.

use anyhow::Result;
use chrono::{DateTime, NaiveDateTime, Utc};
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::RemoteConfig;
use crate::models::{Category, InventoryItem, NewInventoryItem, ShoppingListItem};

use super::{RemoteError, RemoteOutcome};

/// HTTP request timeout in seconds.
/// 30s allows for slow responses while failing fast enough that the
/// background sync leg does not linger forever.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Remote store adapter. Holds either a configured client or nothing;
/// with nothing configured every call is a no-op reporting
/// `Unavailable`.
///
/// Clone is cheap - reqwest::Client uses Arc internally for connection
/// pooling.
#[derive(Clone)]
pub struct RemoteStore {
    inner: Option<RemoteClient>,
}

#[derive(Clone)]
struct RemoteClient {
    http: Client,
    base_url: String,
    api_key: String,
}

/// Remote row shape for the `inventory` table.
///
/// `base_price` arrives as whatever the backend's numeric column
/// serializes to (number or string), so it is coerced rather than
/// parsed strictly.
#[derive(Debug, Deserialize)]
struct InventoryRow {
    id: String,
    name: String,
    category: String,
    #[serde(default)]
    base_price: serde_json::Value,
    #[serde(default)]
    created_at: String,
}

impl InventoryRow {
    fn into_item(self) -> InventoryItem {
        InventoryItem {
            id: self.id,
            name: self.name,
            category: Category::from_remote(&self.category),
            base_price: coerce_price(&self.base_price),
            created_at: parse_timestamp(&self.created_at),
            extra: serde_json::Map::new(),
        }
    }
}

/// Row shape for the append-only `ledger` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerRow {
    pub item_name: String,
    pub category: String,
    pub quantity: i64,
    pub amount: f64,
}

impl LedgerRow {
    fn from_line(line: &ShoppingListItem) -> Self {
        Self {
            item_name: line.name.clone(),
            category: line.category.to_string(),
            quantity: line.quantity,
            amount: line.quantity as f64 * line.base_price,
        }
    }
}

/// Coerce a remote price value to a non-negative decimal.
/// Anything unparseable or negative becomes 0.
fn coerce_price(value: &serde_json::Value) -> f64 {
    let parsed = match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match parsed {
        Some(p) if p.is_finite() && p >= 0.0 => p,
        _ => 0.0,
    }
}

/// Parse a remote timestamp, tolerating both RFC 3339 and the
/// offset-less form Postgres emits for `timestamp` columns. Falls back
/// to now so a single odd row cannot fail the whole fetch.
fn parse_timestamp(s: &str) -> DateTime<Utc> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return dt.with_timezone(&Utc);
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return naive.and_utc();
    }
    warn!(raw = s, "Unparseable remote timestamp, substituting now");
    Utc::now()
}

impl RemoteStore {
    /// Build a store from optional configuration. `None` yields the
    /// unconfigured store whose every call reports `Unavailable`.
    pub fn new(config: Option<RemoteConfig>) -> Result<Self> {
        let inner = match config {
            Some(config) => {
                let http = Client::builder()
                    .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
                    .build()?;
                Some(RemoteClient {
                    http,
                    base_url: config.url.trim_end_matches('/').to_string(),
                    api_key: config.api_key,
                })
            }
            None => None,
        };
        Ok(Self { inner })
    }

    /// Build a store from the environment; unset variables yield the
    /// unconfigured store.
    pub fn from_env() -> Result<Self> {
        Self::new(RemoteConfig::from_env())
    }

    /// A store with no backend. Every call is a no-op.
    pub fn unconfigured() -> Self {
        Self { inner: None }
    }

    pub fn is_configured(&self) -> bool {
        self.inner.is_some()
    }

    /// Fetch the full remote catalog, newest first.
    pub async fn fetch_inventory(&self) -> RemoteOutcome<Vec<InventoryItem>> {
        let Some(client) = &self.inner else {
            debug!("No remote backend configured, skipping inventory fetch");
            return RemoteOutcome::Unavailable;
        };

        match client.fetch_inventory().await {
            Ok(items) => {
                debug!(count = items.len(), "Fetched remote inventory");
                RemoteOutcome::Ok(items)
            }
            Err(e) => {
                warn!(error = %e, "Remote inventory fetch failed");
                RemoteOutcome::Failed(e)
            }
        }
    }

    /// Insert one catalog row. When `id` is supplied it becomes the
    /// remote primary key, so local and remote identifiers coincide.
    pub async fn insert_inventory_item(
        &self,
        draft: &NewInventoryItem,
        id: Option<&str>,
    ) -> RemoteOutcome<InventoryItem> {
        let Some(client) = &self.inner else {
            debug!("No remote backend configured, skipping inventory insert");
            return RemoteOutcome::Unavailable;
        };

        match client.insert_inventory_item(draft, id).await {
            Ok(item) => {
                debug!(id = %item.id, "Remote inventory insert confirmed");
                RemoteOutcome::Ok(item)
            }
            Err(e) => {
                warn!(error = %e, "Remote inventory insert failed");
                RemoteOutcome::Failed(e)
            }
        }
    }

    /// Best-effort remote delete of one catalog row.
    pub async fn delete_inventory_item(&self, id: &str) -> RemoteOutcome<()> {
        let Some(client) = &self.inner else {
            debug!("No remote backend configured, skipping inventory delete");
            return RemoteOutcome::Unavailable;
        };

        match client.delete_inventory_item(id).await {
            Ok(()) => RemoteOutcome::Ok(()),
            Err(e) => {
                warn!(error = %e, id, "Remote inventory delete failed");
                RemoteOutcome::Failed(e)
            }
        }
    }

    /// Append purchased lines to the remote ledger. Empty input is a
    /// success without touching the network.
    pub async fn insert_ledger_entries(
        &self,
        lines: &[ShoppingListItem],
    ) -> RemoteOutcome<Vec<LedgerRow>> {
        if lines.is_empty() {
            return RemoteOutcome::Ok(Vec::new());
        }

        let Some(client) = &self.inner else {
            debug!("No remote backend configured, skipping ledger append");
            return RemoteOutcome::Unavailable;
        };

        let rows: Vec<LedgerRow> = lines.iter().map(LedgerRow::from_line).collect();
        match client.insert_ledger_entries(&rows).await {
            Ok(confirmed) => {
                debug!(count = confirmed.len(), "Ledger entries appended");
                RemoteOutcome::Ok(confirmed)
            }
            Err(e) => {
                warn!(error = %e, "Remote ledger append failed");
                RemoteOutcome::Failed(e)
            }
        }
    }
}

impl RemoteClient {
    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn auth_headers(&self) -> Result<header::HeaderMap, RemoteError> {
        let mut headers = header::HeaderMap::new();
        let key = header::HeaderValue::from_str(&self.api_key)
            .map_err(|e| RemoteError::InvalidResponse(format!("Bad API key header: {}", e)))?;
        let bearer = header::HeaderValue::from_str(&format!("Bearer {}", self.api_key))
            .map_err(|e| RemoteError::InvalidResponse(format!("Bad API key header: {}", e)))?;
        headers.insert("apikey", key);
        headers.insert(header::AUTHORIZATION, bearer);
        Ok(headers)
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, RemoteError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(RemoteError::from_status(status, &body))
        }
    }

    async fn fetch_inventory(&self) -> Result<Vec<InventoryItem>, RemoteError> {
        let response = self
            .http
            .get(self.table_url("inventory"))
            .headers(self.auth_headers()?)
            .query(&[("select", "*"), ("order", "created_at.desc")])
            .send()
            .await?;

        let response = Self::check_response(response).await?;

        let rows: Vec<InventoryRow> = response.json().await?;
        Ok(rows.into_iter().map(InventoryRow::into_item).collect())
    }

    async fn insert_inventory_item(
        &self,
        draft: &NewInventoryItem,
        id: Option<&str>,
    ) -> Result<InventoryItem, RemoteError> {
        let mut body = serde_json::json!({
            "name": draft.name,
            "category": draft.category,
            "base_price": draft.base_price,
        });
        if let Some(id) = id {
            body["id"] = serde_json::Value::String(id.to_string());
        }

        let response = self
            .http
            .post(self.table_url("inventory"))
            .headers(self.auth_headers()?)
            .header("Prefer", "return=representation")
            .json(&body)
            .send()
            .await?;

        let response = Self::check_response(response).await?;

        let mut rows: Vec<InventoryRow> = response.json().await?;
        if rows.is_empty() {
            return Err(RemoteError::InvalidResponse(
                "Insert returned no rows".to_string(),
            ));
        }
        Ok(rows.remove(0).into_item())
    }

    async fn delete_inventory_item(&self, id: &str) -> Result<(), RemoteError> {
        let response = self
            .http
            .delete(self.table_url("inventory"))
            .headers(self.auth_headers()?)
            .query(&[("id", format!("eq.{}", id))])
            .send()
            .await?;

        Self::check_response(response).await?;
        Ok(())
    }

    async fn insert_ledger_entries(
        &self,
        rows: &[LedgerRow],
    ) -> Result<Vec<LedgerRow>, RemoteError> {
        let response = self
            .http
            .post(self.table_url("ledger"))
            .headers(self.auth_headers()?)
            .header("Prefer", "return=representation")
            .json(rows)
            .send()
            .await?;

        let response = Self::check_response(response).await?;
        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coerce_price() {
        assert_eq!(coerce_price(&serde_json::json!(12.5)), 12.5);
        assert_eq!(coerce_price(&serde_json::json!("7.25")), 7.25);
        assert_eq!(coerce_price(&serde_json::json!(" 3 ")), 3.0);
        // Negative, unparseable and missing values default to 0
        assert_eq!(coerce_price(&serde_json::json!(-4.0)), 0.0);
        assert_eq!(coerce_price(&serde_json::json!("not a number")), 0.0);
        assert_eq!(coerce_price(&serde_json::Value::Null), 0.0);
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let rfc = parse_timestamp("2024-03-01T12:00:00Z");
        assert_eq!(rfc.to_rfc3339(), "2024-03-01T12:00:00+00:00");

        let offset = parse_timestamp("2024-03-01T12:00:00+02:00");
        assert_eq!(offset.to_rfc3339(), "2024-03-01T10:00:00+00:00");

        // Offset-less Postgres `timestamp` form is treated as UTC
        let naive = parse_timestamp("2024-03-01T12:00:00.123456");
        assert_eq!(naive.timestamp(), rfc.timestamp());
    }

    #[test]
    fn test_inventory_row_mapping() {
        let row: InventoryRow = serde_json::from_str(
            r#"{"id":"a1","name":"Rice","category":"Grocery","base_price":"60","created_at":"2024-03-01T12:00:00Z"}"#,
        )
        .unwrap();
        let item = row.into_item();
        assert_eq!(item.id, "a1");
        assert_eq!(item.category, Category::Grocery);
        assert_eq!(item.base_price, 60.0);
    }

    #[test]
    fn test_unknown_remote_category_maps_to_other() {
        let row: InventoryRow = serde_json::from_str(
            r#"{"id":"a1","name":"Thing","category":"widgets","base_price":1,"created_at":"2024-03-01T12:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(row.into_item().category, Category::Other);
    }

    #[test]
    fn test_ledger_row_amount_uses_base_price() {
        let item = InventoryItem {
            id: "i".to_string(),
            name: "Rice".to_string(),
            category: Category::Grocery,
            base_price: 60.0,
            created_at: Utc::now(),
            extra: serde_json::Map::new(),
        };
        let mut line = ShoppingListItem::for_item("l".to_string(), &item);
        line.quantity = 2;
        line.manual_price = crate::models::PriceOverride::Observed(75.0);

        let row = LedgerRow::from_line(&line);
        assert_eq!(row.item_name, "Rice");
        assert_eq!(row.category, "Grocery");
        assert_eq!(row.quantity, 2);
        // The ledger audits against the catalog baseline, not the
        // session override
        assert_eq!(row.amount, 120.0);
    }

    #[tokio::test]
    async fn test_unconfigured_store_is_a_no_op() {
        let store = RemoteStore::unconfigured();
        assert!(!store.is_configured());

        assert!(matches!(
            store.fetch_inventory().await,
            RemoteOutcome::Unavailable
        ));
        assert!(matches!(
            store.delete_inventory_item("x").await,
            RemoteOutcome::Unavailable
        ));
        // Empty ledger input succeeds without a backend
        assert!(store.insert_ledger_entries(&[]).await.is_ok());
    }
}

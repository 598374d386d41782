//! Reconciliation between the local cache and the remote store.
//!
//! `ShoppingSession` owns the in-memory catalog and cart for one run
//! of the application. On load it decides which source of truth wins;
//! on every mutation it commits locally first (the caller never waits
//! on the network) and pushes the remote leg as a fire-and-forget
//! background task. A failed remote leg leaves the remote store behind
//! the local cache until the next successful full fetch reconciles it.
//!
//! Mutation is single-threaded: callbacks and network completions
//! interleave on one logical thread, so the collections need no lock.

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use tracing::{debug, info, warn};

use crate::api::{RemoteOutcome, RemoteStore};
use crate::cache::CacheStore;
use crate::models::{
    self, Category, InventoryItem, NewInventoryItem, ShoppingListItem,
};
use crate::pricing;

pub struct ShoppingSession<S: CacheStore> {
    cache: S,
    remote: Arc<RemoteStore>,
    inventory: Vec<InventoryItem>,
    shopping_list: Vec<ShoppingListItem>,
}

impl<S: CacheStore> ShoppingSession<S> {
    /// Load a session, deciding which source is authoritative for the
    /// catalog.
    ///
    /// A non-empty remote catalog wins and is mirrored into the cache;
    /// an empty, unconfigured or failed remote falls back to whatever
    /// the cache holds. The shopping list is never remote-backed and
    /// always loads from the cache. Remote trouble never fails the
    /// load; corrupt local state does.
    pub async fn load(cache: S, remote: RemoteStore) -> Result<Self> {
        let outcome = remote.fetch_inventory().await;
        let inventory = reconcile_inventory(outcome, &cache)?;
        let shopping_list = cache
            .read_shopping_list()
            .context("Failed to load cached shopping list")?;

        Ok(Self {
            cache,
            remote: Arc::new(remote),
            inventory,
            shopping_list,
        })
    }

    pub fn inventory(&self) -> &[InventoryItem] {
        &self.inventory
    }

    pub fn shopping_list(&self) -> &[ShoppingListItem] {
        &self.shopping_list
    }

    // ===== Catalog mutations =====

    /// Add a catalog item.
    ///
    /// The remote insert is requested first with a pre-generated id so
    /// local and remote identity coincide; if the remote declines or
    /// errors, a local-only record with the same id is synthesized
    /// instead. Either way the caller gets a usable record and the
    /// cache reflects it before this returns.
    pub async fn add_inventory_item(
        &mut self,
        name: &str,
        category: Category,
        base_price: f64,
    ) -> Result<InventoryItem> {
        let name = name.trim();
        if name.is_empty() {
            bail!("Item name must not be blank");
        }
        if !base_price.is_finite() || base_price < 0.0 {
            bail!("Base price must be a non-negative number");
        }

        let draft = NewInventoryItem {
            name: name.to_string(),
            category,
            base_price,
        };
        let id = models::new_id();

        let item = match self.remote.insert_inventory_item(&draft, Some(&id)).await {
            RemoteOutcome::Ok(item) => item,
            outcome => {
                debug!(?outcome, id = %id, "Using local-only record for new item");
                InventoryItem::from_draft(&draft, id, Utc::now())
            }
        };

        // Newest first, matching the remote fetch order
        self.inventory.insert(0, item.clone());
        self.cache
            .write_inventory(&self.inventory)
            .context("Failed to cache new inventory item")?;

        info!(id = %item.id, name = %item.name, "Added inventory item");
        Ok(item)
    }

    /// Remove a catalog item and every cart line that references it.
    ///
    /// The local removal is synchronous; the remote delete runs in the
    /// background and its failure only means the remote catalog lags
    /// until the next fetch. Returns false when the id is unknown.
    pub async fn remove_inventory_item(&mut self, id: &str) -> Result<bool> {
        let before = self.inventory.len();
        self.inventory.retain(|item| item.id != id);
        if self.inventory.len() == before {
            return Ok(false);
        }
        self.cache
            .write_inventory(&self.inventory)
            .context("Failed to cache inventory after delete")?;

        // Cascade: drop dependent lines, rebuild the rest through the
        // normal add path so copied fields stay consistent with the
        // catalog
        let survivors: Vec<ShoppingListItem> = self
            .shopping_list
            .iter()
            .filter(|line| line.inventory_item_id != id)
            .cloned()
            .collect();
        self.rebuild_cart(survivors)?;

        let remote = Arc::clone(&self.remote);
        let id = id.to_string();
        tokio::spawn(async move {
            if !remote.delete_inventory_item(&id).await.is_ok() {
                warn!(id = %id, "Remote delete not confirmed, remote catalog lags local");
            }
        });

        Ok(true)
    }

    // ===== Cart mutations (cache-only, never remote) =====

    /// Put an inventory item on the shopping list. Adding an item that
    /// already has a line increments that line instead of duplicating
    /// it.
    pub fn add_to_cart(&mut self, inventory_id: &str) -> Result<&ShoppingListItem> {
        let item = self
            .inventory
            .iter()
            .find(|i| i.id == inventory_id)
            .ok_or_else(|| anyhow::anyhow!("Unknown inventory item: {}", inventory_id))?;

        let idx = match self
            .shopping_list
            .iter()
            .position(|line| line.inventory_item_id == inventory_id)
        {
            Some(idx) => {
                self.shopping_list[idx].quantity += 1;
                idx
            }
            None => {
                let line = ShoppingListItem::for_item(models::new_id(), item);
                self.shopping_list.push(line);
                self.shopping_list.len() - 1
            }
        };

        self.persist_cart()?;
        Ok(&self.shopping_list[idx])
    }

    /// Set a line's quantity. Values below 1 clamp to 1, never reject.
    pub fn update_quantity(&mut self, line_id: &str, quantity: i64) -> Result<()> {
        let line = self.line_mut(line_id)?;
        line.quantity = quantity.max(1);
        self.persist_cart()
    }

    /// Flip a line's purchased flag, returning the new state.
    pub fn toggle_purchased(&mut self, line_id: &str) -> Result<bool> {
        let line = self.line_mut(line_id)?;
        line.purchased = !line.purchased;
        let purchased = line.purchased;
        self.persist_cart()?;
        Ok(purchased)
    }

    /// Record the price actually observed at the shelf for this
    /// session. Follows the pricing commit rule: invalid entries and
    /// entries equal to the baseline clear the override. The catalog's
    /// base price is never touched here.
    pub fn set_observed_price(&mut self, line_id: &str, entered: f64) -> Result<()> {
        let line = self.line_mut(line_id)?;
        line.manual_price = pricing::commit_observed_price(entered, line.base_price);
        self.persist_cart()
    }

    /// Remove one line. Returns false when the id is unknown.
    pub fn remove_line(&mut self, line_id: &str) -> Result<bool> {
        let before = self.shopping_list.len();
        self.shopping_list.retain(|line| line.id != line_id);
        if self.shopping_list.len() == before {
            return Ok(false);
        }
        self.persist_cart()?;
        Ok(true)
    }

    /// Drop every line.
    pub fn clear_cart(&mut self) -> Result<()> {
        self.shopping_list.clear();
        self.persist_cart()
    }

    /// Finish the shopping trip: purchased lines leave the cart and are
    /// appended to the remote ledger in the background, best-effort.
    /// Returns the completed lines.
    pub async fn complete_purchases(&mut self) -> Result<Vec<ShoppingListItem>> {
        let purchased: Vec<ShoppingListItem> = self
            .shopping_list
            .iter()
            .filter(|line| line.purchased)
            .cloned()
            .collect();
        if purchased.is_empty() {
            return Ok(purchased);
        }

        self.shopping_list.retain(|line| !line.purchased);
        self.persist_cart()?;

        let remote = Arc::clone(&self.remote);
        let lines = purchased.clone();
        tokio::spawn(async move {
            match remote.insert_ledger_entries(&lines).await {
                RemoteOutcome::Ok(rows) => {
                    info!(count = rows.len(), "Purchase ledger appended")
                }
                outcome => warn!(?outcome, "Purchase ledger append not confirmed"),
            }
        });

        Ok(purchased)
    }

    // ===== Internals =====

    fn line_mut(&mut self, line_id: &str) -> Result<&mut ShoppingListItem> {
        self.shopping_list
            .iter_mut()
            .find(|line| line.id == line_id)
            .ok_or_else(|| anyhow::anyhow!("Unknown cart line: {}", line_id))
    }

    fn persist_cart(&self) -> Result<()> {
        self.cache
            .write_shopping_list(&self.shopping_list)
            .context("Failed to cache shopping list")
    }

    /// Rebuild the cart from surviving lines, re-deriving each line's
    /// copied fields from the current catalog entry while keeping its
    /// identity, quantity, purchased flag and override.
    fn rebuild_cart(&mut self, survivors: Vec<ShoppingListItem>) -> Result<()> {
        let mut rebuilt = Vec::with_capacity(survivors.len());
        for old in survivors {
            let line = match self
                .inventory
                .iter()
                .find(|item| item.id == old.inventory_item_id)
            {
                Some(item) => {
                    let mut line = ShoppingListItem::for_item(old.id.clone(), item);
                    line.quantity = old.quantity.max(1);
                    line.purchased = old.purchased;
                    line.manual_price = old.manual_price;
                    line
                }
                // Source item gone but line not targeted: the copied
                // fields keep it renderable, so keep it as-is
                None => old,
            };
            rebuilt.push(line);
        }
        self.shopping_list = rebuilt;
        self.persist_cart()
    }
}

/// Startup decision: which catalog wins.
///
/// A non-empty remote result is authoritative and replaces the cached
/// inventory wholesale (any local-only edits made while offline are
/// discarded - a known data-loss window, accepted as last-write-wins).
/// Everything else falls back to the cache; an empty remote catalog,
/// an unconfigured backend and a transient failure are deliberately
/// indistinguishable to the caller, though each logs differently.
fn reconcile_inventory<S: CacheStore>(
    outcome: RemoteOutcome<Vec<InventoryItem>>,
    cache: &S,
) -> Result<Vec<InventoryItem>> {
    match outcome {
        RemoteOutcome::Ok(items) if !items.is_empty() => {
            info!(count = items.len(), "Remote catalog wins, mirroring into cache");
            cache
                .write_inventory(&items)
                .context("Failed to mirror remote inventory into cache")?;
            Ok(items)
        }
        RemoteOutcome::Ok(_) => {
            debug!("Remote catalog empty, keeping cached inventory");
            cache.read_inventory()
        }
        RemoteOutcome::Unavailable => {
            debug!("No remote backend, loading cached inventory");
            cache.read_inventory()
        }
        RemoteOutcome::Failed(e) => {
            warn!(error = %e, "Remote fetch failed, falling back to cached inventory");
            cache.read_inventory()
        }
    }
}

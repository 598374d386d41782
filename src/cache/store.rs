use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Serialize};

use crate::models::{InventoryItem, ShoppingListItem};

/// Bucket name for the catalog collection.
const INVENTORY_BUCKET: &str = "inventory";

/// Bucket name for the cart collection.
const SHOPPING_LIST_BUCKET: &str = "shopping_list";

/// Storage port for the two local collections.
///
/// All four operations are synchronous and total for well-formed
/// state: reads return an empty vec when nothing has been stored yet.
/// The only error path is corrupt stored data, which has no sensible
/// fallback and so propagates.
pub trait CacheStore {
    fn read_inventory(&self) -> Result<Vec<InventoryItem>>;
    fn write_inventory(&self, items: &[InventoryItem]) -> Result<()>;
    fn read_shopping_list(&self) -> Result<Vec<ShoppingListItem>>;
    fn write_shopping_list(&self, items: &[ShoppingListItem]) -> Result<()>;
}

impl<T: CacheStore + ?Sized> CacheStore for &T {
    fn read_inventory(&self) -> Result<Vec<InventoryItem>> {
        (**self).read_inventory()
    }

    fn write_inventory(&self, items: &[InventoryItem]) -> Result<()> {
        (**self).write_inventory(items)
    }

    fn read_shopping_list(&self) -> Result<Vec<ShoppingListItem>> {
        (**self).read_shopping_list()
    }

    fn write_shopping_list(&self, items: &[ShoppingListItem]) -> Result<()> {
        (**self).write_shopping_list(items)
    }
}

/// JSON-file-backed cache store, one file per bucket.
pub struct FileStore {
    cache_dir: PathBuf,
}

impl FileStore {
    pub fn new(cache_dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&cache_dir)
            .with_context(|| format!("Failed to create cache directory: {}", cache_dir.display()))?;
        Ok(Self { cache_dir })
    }

    fn bucket_path(&self, name: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.json", name))
    }

    fn load<T: DeserializeOwned>(&self, name: &str) -> Result<Vec<T>> {
        let path = self.bucket_path(name);
        if !path.exists() {
            return Ok(Vec::new());
        }

        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read cache bucket: {}", name))?;

        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse cache bucket: {}", name))
    }

    fn save<T: Serialize>(&self, name: &str, items: &[T]) -> Result<()> {
        let path = self.bucket_path(name);
        let contents = serde_json::to_string_pretty(items)?;
        std::fs::write(&path, contents)
            .with_context(|| format!("Failed to write cache bucket: {}", name))?;
        Ok(())
    }
}

impl CacheStore for FileStore {
    fn read_inventory(&self) -> Result<Vec<InventoryItem>> {
        self.load(INVENTORY_BUCKET)
    }

    fn write_inventory(&self, items: &[InventoryItem]) -> Result<()> {
        self.save(INVENTORY_BUCKET, items)
    }

    fn read_shopping_list(&self) -> Result<Vec<ShoppingListItem>> {
        self.load(SHOPPING_LIST_BUCKET)
    }

    fn write_shopping_list(&self, items: &[ShoppingListItem]) -> Result<()> {
        self.save(SHOPPING_LIST_BUCKET, items)
    }
}

/// In-memory cache store for tests and ephemeral runs.
#[derive(Default)]
pub struct MemoryStore {
    inventory: Mutex<Vec<InventoryItem>>,
    shopping_list: Mutex<Vec<ShoppingListItem>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CacheStore for MemoryStore {
    fn read_inventory(&self) -> Result<Vec<InventoryItem>> {
        Ok(self.inventory.lock().unwrap().clone())
    }

    fn write_inventory(&self, items: &[InventoryItem]) -> Result<()> {
        *self.inventory.lock().unwrap() = items.to_vec();
        Ok(())
    }

    fn read_shopping_list(&self) -> Result<Vec<ShoppingListItem>> {
        Ok(self.shopping_list.lock().unwrap().clone())
    }

    fn write_shopping_list(&self, items: &[ShoppingListItem]) -> Result<()> {
        *self.shopping_list.lock().unwrap() = items.to_vec();
        Ok(())
    }
}

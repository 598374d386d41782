//! Cartcache - a local-first shopping catalog and cart.
//!
//! This crate keeps a purchasable-item catalog and a transient shopping
//! list consistent between a fast local cache and a hosted relational
//! store. Writes land in the cache synchronously so the caller never
//! waits on the network; the remote leg runs in the background and is
//! best-effort. A pure pricing layer derives effective prices and
//! deviation classes for cart lines.
//!
//! UI, formatting, and auth live in consumers of this crate.

pub mod api;
pub mod cache;
pub mod config;
pub mod models;
pub mod pricing;
pub mod session;

pub use api::{RemoteError, RemoteOutcome, RemoteStore};
pub use cache::{CacheStore, FileStore, MemoryStore};
pub use config::RemoteConfig;
pub use models::{Category, InventoryItem, PriceOverride, ShoppingListItem};
pub use session::ShoppingSession;

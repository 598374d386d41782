//! Local cache storage for the catalog and the shopping list.
//!
//! The cache is the synchronous half of the persistence layer: every
//! mutation lands here first, and the UI re-reads from here. Data is
//! stored as two JSON buckets. An empty or missing bucket is the
//! defined empty state, not an error; a corrupt bucket is fatal to the
//! read and propagates to the caller. Fields a blob carries that this
//! version does not model survive a read-then-write cycle.

pub mod store;

pub use store::{CacheStore, FileStore, MemoryStore};

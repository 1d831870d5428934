//! In-process key-value store for compiled pages.
//!
//! Stands in for an external cache: one flat namespace, `set` and `get`.
//! Values are shared `Arc<str>` so a request can hold a page body while a
//! rebuild overwrites the key.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;

use super::CacheKey;

/// The two operations the rest of the crate needs from a cache.
pub trait CacheStore: Send + Sync {
    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &CacheKey, value: String);

    /// Look up `key`. `None` on miss.
    fn get(&self, key: &CacheKey) -> Option<Arc<str>>;
}

/// Thread-safe in-memory store.
///
/// # Thread Safety
///
/// Uses `RwLock` to allow:
/// - Multiple concurrent reads (request workers)
/// - Exclusive writes (rebuild)
///
/// There is no transaction across keys: a reader running during a rebuild
/// may see some keys already replaced and others not yet.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<BTreeMap<String, Arc<str>>>,
}

impl MemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Check if the store has any data.
    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// All keys, sorted.
    #[cfg(test)]
    pub fn keys(&self) -> Vec<String> {
        self.entries.read().keys().cloned().collect()
    }
}

impl CacheStore for MemoryStore {
    fn set(&self, key: &CacheKey, value: String) {
        self.entries
            .write()
            .insert(key.as_str().to_owned(), Arc::from(value));
    }

    fn get(&self, key: &CacheKey) -> Option<Arc<str>> {
        self.entries.read().get(key.as_str()).cloned()
    }
}

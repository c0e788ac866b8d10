use async_trait::async_trait;
use cascata_types::{CacheEntry, CascataError};
use moka::future::Cache;

use crate::CacheStore;

/// Process-local cache tier.
///
/// Bounded by entry count and evicted by recency only; there is no time-based
/// expiry, so an old entry remains readable for stale-serve until it is
/// superseded or pushed out by capacity. Contents are lost on restart.
#[derive(Clone)]
pub struct MemoryStore {
    inner: Cache<String, CacheEntry>,
}

impl MemoryStore {
    /// Create a store holding at most `max_entries` entries.
    #[must_use]
    pub fn new(max_entries: u64) -> Self {
        // Avoid a zero-capacity cache that rejects every insert
        let cap = max_entries.max(1);
        Self {
            inner: Cache::builder().max_capacity(cap).build(),
        }
    }

    /// Insert or replace an entry. Never fails.
    pub async fn insert(&self, entry: CacheEntry) {
        self.inner.insert(entry.key.clone(), entry).await;
    }

    /// Approximate number of live entries.
    #[must_use]
    pub fn entry_count(&self) -> u64 {
        self.inner.entry_count()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(10_000)
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("entries", &self.inner.entry_count())
            .finish()
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, key: &str) -> Option<CacheEntry> {
        self.inner.get(key).await
    }

    async fn set(&self, entry: CacheEntry) -> Result<(), CascataError> {
        self.insert(entry).await;
        Ok(())
    }

    async fn clear(&self) -> Result<(), CascataError> {
        self.inner.invalidate_all();
        self.inner.run_pending_tasks().await;
        Ok(())
    }
}

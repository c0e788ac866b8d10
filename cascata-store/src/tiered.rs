use std::sync::Arc;

use async_trait::async_trait;
use cascata_types::{CacheEntry, CascataError, StoreConfig};

use crate::{CacheStore, MemoryStore, SqliteStore};

/// In-process tier in front of an optional durable tier.
///
/// Writes always land in memory and, when configured, in the durable tier.
/// A durable failure is logged and demoted: the memory tier keeps serving.
/// Reads consult both tiers and return the more recently fetched entry.
pub struct TieredStore {
    memory: MemoryStore,
    durable: Option<Arc<dyn CacheStore>>,
}

impl std::fmt::Debug for TieredStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TieredStore")
            .field("memory", &self.memory)
            .field("durable", &self.durable.as_ref().map(|d| d.name()))
            .finish()
    }
}

impl TieredStore {
    /// Memory-only store. Entries do not survive a restart.
    #[must_use]
    pub fn memory_only(memory: MemoryStore) -> Self {
        Self {
            memory,
            durable: None,
        }
    }

    /// Memory tier backed by `durable`.
    #[must_use]
    pub fn with_durable(memory: MemoryStore, durable: Arc<dyn CacheStore>) -> Self {
        Self {
            memory,
            durable: Some(durable),
        }
    }

    /// Build from configuration.
    ///
    /// An SQLite path that cannot be opened is logged and the store runs
    /// memory-only.
    #[must_use]
    pub fn from_config(cfg: &StoreConfig) -> Self {
        let memory = MemoryStore::new(cfg.memory_max_entries);
        let Some(path) = &cfg.sqlite_path else {
            return Self::memory_only(memory);
        };
        match SqliteStore::open(path) {
            Ok(sqlite) => Self::with_durable(memory, Arc::new(sqlite)),
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "durable cache unavailable; running memory-only"
                );
                Self::memory_only(memory)
            }
        }
    }

    /// Whether a durable tier is attached.
    #[must_use]
    pub const fn is_durable(&self) -> bool {
        self.durable.is_some()
    }
}

#[async_trait]
impl CacheStore for TieredStore {
    fn name(&self) -> &'static str {
        "tiered"
    }

    async fn get(&self, key: &str) -> Option<CacheEntry> {
        let mem = self.memory.get(key).await;
        let Some(durable) = &self.durable else {
            return mem;
        };
        let disk = durable.get(key).await;
        match (mem, disk) {
            (Some(m), Some(d)) if d.fetched_at > m.fetched_at => {
                self.memory.insert(d.clone()).await;
                Some(d)
            }
            (Some(m), _) => Some(m),
            (None, Some(d)) => {
                // Warm the memory tier after a restart
                self.memory.insert(d.clone()).await;
                Some(d)
            }
            (None, None) => None,
        }
    }

    async fn set(&self, entry: CacheEntry) -> Result<(), CascataError> {
        if let Some(durable) = &self.durable
            && let Err(e) = durable.set(entry.clone()).await
        {
            tracing::warn!(key = %entry.key, error = %e, "durable cache write failed; kept in memory");
        }
        self.memory.insert(entry).await;
        Ok(())
    }

    async fn clear(&self) -> Result<(), CascataError> {
        self.memory.clear().await?;
        if let Some(durable) = &self.durable {
            durable.clear().await?;
        }
        Ok(())
    }
}

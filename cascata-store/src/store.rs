use async_trait::async_trait;
use cascata_types::{CacheEntry, CascataError};

/// Key to entry persistence shared by every request.
///
/// `get` answers `None` both for a true miss and for an unreachable backend;
/// callers must not need to tell them apart. `set` replaces the whole entry for
/// its key and never writes partially.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Short label used in logs.
    fn name(&self) -> &'static str;

    /// Read the entry stored under `key`.
    async fn get(&self, key: &str) -> Option<CacheEntry>;

    /// Upsert `entry` under `entry.key`.
    ///
    /// # Errors
    /// Returns `CacheStoreUnavailable` when the backend cannot persist the entry.
    /// Callers treat this as best-effort and log it.
    async fn set(&self, entry: CacheEntry) -> Result<(), CascataError>;

    /// Drop every entry.
    ///
    /// # Errors
    /// Returns `CacheStoreUnavailable` when the backend cannot be cleared.
    async fn clear(&self) -> Result<(), CascataError>;
}

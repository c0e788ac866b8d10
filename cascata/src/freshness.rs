//! The `cache_or` primitive: serve fresh entries, refetch expired ones, and
//! fall back to the expired entry when the refetch fails.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use cascata_core::{CacheEntry, CacheStatus, Cached, CascataError, Clock};
use cascata_store::CacheStore;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::OwnedMutexGuard;

type LockMap = Arc<Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>>;

/// Per-key async locks; an entry lives only while some caller holds or awaits it.
#[derive(Default, Clone)]
struct InflightLocks {
    map: LockMap,
}

struct InflightGuard {
    key: String,
    map: LockMap,
    guard: Option<OwnedMutexGuard<()>>,
}

impl InflightLocks {
    async fn acquire(&self, key: &str) -> InflightGuard {
        let lock = {
            let mut map = self
                .map
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            Arc::clone(map.entry(key.to_string()).or_default())
        };
        let guard = lock.lock_owned().await;
        InflightGuard {
            key: key.to_string(),
            map: Arc::clone(&self.map),
            guard: Some(guard),
        }
    }

    fn len(&self) -> usize {
        self.map
            .lock()
            .map(|m| m.len())
            .unwrap_or_default()
    }
}

impl Drop for InflightGuard {
    fn drop(&mut self) {
        drop(self.guard.take());
        let mut map = self
            .map
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if let Some(lock) = map.get(&self.key)
            && Arc::strong_count(lock) == 1
        {
            map.remove(&self.key);
        }
    }
}

/// Freshness policy over a shared cache store.
///
/// Cheap to clone; clones share the store, clock, and in-flight locks.
///
/// Concurrent misses on one key are not deduplicated unless coalescing is
/// enabled: by default two callers that both see an expired entry both run
/// their fetch, and the later write wins.
#[derive(Clone)]
pub struct Freshness {
    store: Arc<dyn CacheStore>,
    clock: Arc<dyn Clock>,
    inflight: Option<InflightLocks>,
}

impl std::fmt::Debug for Freshness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Freshness")
            .field("store", &self.store.name())
            .field("coalescing", &self.inflight.is_some())
            .finish()
    }
}

impl Freshness {
    /// Policy over `store` with time from `clock`; coalescing off.
    #[must_use]
    pub fn new(store: Arc<dyn CacheStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            inflight: None,
        }
    }

    /// Toggle per-key coalescing of concurrent misses.
    ///
    /// When on, a caller that finds the entry expired takes a per-key lock,
    /// re-reads the store, and only fetches if the entry is still expired.
    #[must_use]
    pub fn with_coalescing(mut self, yes: bool) -> Self {
        self.inflight = yes.then(InflightLocks::default);
        self
    }

    /// Underlying store.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn CacheStore> {
        &self.store
    }

    /// Number of keys with a pending coalesced fetch.
    #[must_use]
    pub fn inflight_keys(&self) -> usize {
        self.inflight.as_ref().map_or(0, InflightLocks::len)
    }

    async fn read<T: DeserializeOwned>(&self, key: &str) -> Option<(T, DateTime<Utc>)> {
        let entry = self.store.get(key).await?;
        match serde_json::from_value::<T>(entry.payload) {
            Ok(v) => Some((v, entry.fetched_at)),
            Err(e) => {
                tracing::warn!(key, error = %e, "cached payload no longer decodes; ignoring");
                None
            }
        }
    }

    fn is_fresh(&self, fetched_at: DateTime<Utc>, max_age: Duration) -> bool {
        // Entries dated in the future (clock skew) count as age zero.
        let age = (self.clock.now() - fetched_at).to_std().unwrap_or_default();
        age < max_age
    }

    /// Return the cached value for `key` if younger than `max_age`, otherwise run
    /// `fetch` and write its result back.
    ///
    /// A `max_age` of zero always refetches.
    ///
    /// # Errors
    /// Returns `NoDataAvailable` when `fetch` fails and no prior entry exists. When
    /// a prior entry exists it is returned with `CacheStatus::Stale` instead.
    #[tracing::instrument(
        name = "cascata::freshness::cache_or",
        skip_all,
        fields(key = %key, max_age_ms = u64::try_from(max_age.as_millis()).unwrap_or(u64::MAX)),
    )]
    pub async fn cache_or<T, F, Fut>(
        &self,
        key: &str,
        max_age: Duration,
        fetch: F,
    ) -> Result<Cached<T>, CascataError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, CascataError>>,
    {
        let mut prior = self.read::<T>(key).await;
        if let Some((value, fetched_at)) = prior.take_if(|(_, at)| self.is_fresh(*at, max_age)) {
            tracing::debug!("cache hit");
            return Ok(Cached {
                value,
                status: CacheStatus::Hit,
                fetched_at,
            });
        }

        let _inflight = match &self.inflight {
            Some(locks) => {
                let guard = locks.acquire(key).await;
                // Another caller may have refreshed while we waited.
                prior = self.read::<T>(key).await;
                if let Some((value, fetched_at)) =
                    prior.take_if(|(_, at)| self.is_fresh(*at, max_age))
                {
                    tracing::debug!("cache hit after coalesced wait");
                    return Ok(Cached {
                        value,
                        status: CacheStatus::Hit,
                        fetched_at,
                    });
                }
                Some(guard)
            }
            None => None,
        };

        match fetch().await {
            Ok(value) => {
                let fetched_at = self.clock.now();
                self.write_back(key, &value, fetched_at).await;
                tracing::debug!("cache miss; refreshed");
                Ok(Cached {
                    value,
                    status: CacheStatus::Miss,
                    fetched_at,
                })
            }
            Err(e) => match prior {
                Some((value, fetched_at)) => {
                    tracing::warn!(error = %e, %fetched_at, "refresh failed; serving stale entry");
                    Ok(Cached {
                        value,
                        status: CacheStatus::Stale,
                        fetched_at,
                    })
                }
                None => {
                    tracing::warn!(error = %e, "refresh failed and nothing cached");
                    Err(CascataError::no_data(key, e))
                }
            },
        }
    }

    async fn write_back<T: Serialize>(&self, key: &str, value: &T, fetched_at: DateTime<Utc>) {
        let payload = match serde_json::to_value(value) {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!(key, error = %e, "payload not serializable; not cached");
                return;
            }
        };
        if let Err(e) = self
            .store
            .set(CacheEntry::new(key, payload, fetched_at))
            .await
        {
            tracing::warn!(key, store = self.store.name(), error = %e, "cache write failed");
        }
    }
}

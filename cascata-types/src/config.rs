//! Configuration types shared across the orchestrator, store, and connectors.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::Capability;

/// Freshness windows per capability.
///
/// Keys of `per_capability_ttl_ms` are [`Capability::as_str`] labels. A TTL of zero
/// disables the cache-hit path for that capability (every call refetches) while
/// still allowing stale-serve when the refetch fails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TtlConfig {
    /// Fallback freshness window in milliseconds.
    pub default_ttl_ms: u64,
    /// Per-capability overrides in milliseconds.
    pub per_capability_ttl_ms: HashMap<String, u64>,
}

impl Default for TtlConfig {
    fn default() -> Self {
        const MIN: u64 = 60_000;
        const HOUR: u64 = 60 * MIN;
        let per_capability_ttl_ms = [
            (Capability::Quote, 15 * MIN),
            (Capability::History, 12 * HOUR),
            (Capability::Forex, 15 * MIN),
            (Capability::EconomicCalendar, HOUR),
            (Capability::Earnings, 6 * HOUR),
            (Capability::InsiderTrades, 6 * HOUR),
        ]
        .into_iter()
        .map(|(c, ms)| (c.as_str().to_string(), ms))
        .collect();
        Self {
            default_ttl_ms: 15 * MIN,
            per_capability_ttl_ms,
        }
    }
}

impl TtlConfig {
    /// Resolve the freshness window for a capability.
    #[must_use]
    pub fn ttl_for(&self, cap: Capability) -> Duration {
        let ms = self
            .per_capability_ttl_ms
            .get(cap.as_str())
            .copied()
            .unwrap_or(self.default_ttl_ms);
        Duration::from_millis(ms)
    }

    /// Override the freshness window for one capability.
    pub fn set(&mut self, cap: Capability, ttl: Duration) {
        let ms = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX);
        self.per_capability_ttl_ms
            .insert(cap.as_str().to_string(), ms);
    }
}

/// Cache store configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// SQLite database file for the durable tier. `None` runs memory-only.
    pub sqlite_path: Option<PathBuf>,
    /// Upper bound on entries held by the in-process tier.
    pub memory_max_entries: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            sqlite_path: None,
            memory_max_entries: 10_000,
        }
    }
}

/// Global configuration for the `Cascata` orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CascataConfig {
    /// Timeout for individual provider requests.
    pub provider_timeout: Duration,
    /// Optional overall deadline for fan-out aggregations (batch quotes, all sections).
    pub request_timeout: Option<Duration>,
    /// Minimum number of resolved symbols for a batch quote call to succeed.
    ///
    /// Zero means a batch never fails on thin results.
    pub min_batch_quotes: usize,
    /// Serialize concurrent misses on the same cache key.
    ///
    /// Off by default: two concurrent misses both hit upstream. When on, later
    /// callers wait for the first and then read its write-back.
    pub coalesce_inflight: bool,
    /// Freshness windows per capability.
    pub ttl: TtlConfig,
}

impl Default for CascataConfig {
    fn default() -> Self {
        Self {
            provider_timeout: Duration::from_secs(5),
            request_timeout: None,
            min_batch_quotes: 0,
            coalesce_inflight: false,
            ttl: TtlConfig::default(),
        }
    }
}

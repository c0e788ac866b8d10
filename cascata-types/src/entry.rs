//! Cache envelopes: what the store persists and what the freshness layer returns.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One persisted cache record.
///
/// There is at most one entry per key; writing an entry replaces the previous one
/// wholesale. The payload is opaque to the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Cache key, e.g. `quotes:v1:AAPL,MSFT`.
    pub key: String,
    /// Opaque structured payload.
    pub payload: serde_json::Value,
    /// When the payload was fetched from upstream.
    pub fetched_at: DateTime<Utc>,
}

impl CacheEntry {
    /// Convenience constructor.
    pub fn new(key: impl Into<String>, payload: serde_json::Value, fetched_at: DateTime<Utc>) -> Self {
        Self {
            key: key.into(),
            payload,
            fetched_at,
        }
    }
}

/// How a value returned by the freshness layer was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheStatus {
    /// Served from a fresh cache entry; no upstream call.
    Hit,
    /// Fetched from upstream and written back.
    Miss,
    /// Refresh failed; an expired entry was served instead.
    Stale,
}

impl CacheStatus {
    /// Stable lowercase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hit => "hit",
            Self::Miss => "miss",
            Self::Stale => "stale",
        }
    }
}

/// A value plus its cache provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cached<T> {
    /// The payload.
    pub value: T,
    /// Hit, miss, or stale-serve.
    pub status: CacheStatus,
    /// Timestamp of the upstream fetch that produced `value`.
    pub fetched_at: DateTime<Utc>,
}

impl<T> Cached<T> {
    /// True when the value was stale-served after a failed refresh.
    #[must_use]
    pub const fn is_degraded(&self) -> bool {
        matches!(self.status, CacheStatus::Stale)
    }

    /// Transform the payload while keeping provenance.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Cached<U> {
        Cached {
            value: f(self.value),
            status: self.status,
            fetched_at: self.fetched_at,
        }
    }
}

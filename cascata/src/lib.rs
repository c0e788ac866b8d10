//! Cascata serves market data from a cache first and an ordered waterfall of
//! providers second.
//!
//! Overview
//! - Every endpoint is a `cache_or(key, fetch, ttl)` call: a fresh entry is
//!   served as a hit, an expired one triggers a refetch, and a failed refetch
//!   serves the expired entry as stale rather than failing.
//! - Single-subject fetches run a provider chain: providers are tried strictly
//!   in order with a per-call timeout, and the first result that passes that
//!   provider's validator wins. Later providers are never invoked.
//! - Batch quotes and forex fan out one chain per member; failed members are
//!   omitted and listed as missing.
//! - Named sections are cached independently and aggregated with per-section
//!   failure isolation.
//!
//! Key behaviors and trade-offs
//! - Concurrent misses on one key are not deduplicated unless
//!   `coalesce_inflight` is set; without it both callers fetch and the later
//!   write wins.
//! - Cache writes are best-effort. The default store is memory-only and does
//!   not survive a restart; configure an SQLite path for a durable tier.
//!
//! Building an orchestrator:
//! ```rust,ignore
//! use std::sync::Arc;
//! use cascata::{Cascata, Capability};
//!
//! let yahoo: Arc<dyn CascataConnector> = Arc::new(YahooConnector::new());
//! let av: Arc<dyn CascataConnector> = Arc::new(AlphaVantageConnector::from_env()?);
//!
//! let cascata = Cascata::builder()
//!     .with_connector(yahoo.clone())
//!     .with_connector(av.clone())
//!     .prefer_for(Capability::History, &[yahoo, av])
//!     .request_timeout(std::time::Duration::from_secs(8))
//!     .build()?;
//!
//! let batch = cascata.cached_quotes(&["AAPL", "MSFT"]).await?;
//! ```
//!
//! See the `demos` crate for runnable end-to-end demonstrations.
#![warn(missing_docs)]

pub mod chain;
pub(crate) mod core;
pub mod freshness;
pub mod handlers;
mod router;
pub mod sections;

pub use chain::{Attempt, AttemptFailure, ChainOutcome, ProviderChain};
pub use crate::core::{Cascata, CascataBuilder};
pub use freshness::Freshness;
pub use router::util::{join_with_deadline, with_request_deadline};
pub use sections::{Aggregator, Section, SectionRegistry, SectionRegistryBuilder};

pub use cascata_store::{CacheStore, MemoryStore, SqliteStore, TieredStore};

// Re-export core types for convenience
pub use cascata_core::{
    AggregateReport, CacheEntry, CacheStatus, Cached, CalendarEvent, Capability, CascataConfig,
    CascataConnector, CascataError, Clock, ConnectorKey, DailyBar, Decimal, EarningsEvent,
    EarningsWindow, EmptyDefault, FxPair, FxRate, HistoryRequest, Importance, InsiderTrade,
    Quote, QuoteBatch, StoreConfig, SystemClock, TtlConfig, Validation,
};

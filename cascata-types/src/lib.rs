//! Cascata-specific error taxonomy, configuration primitives, and cache envelopes.
#![warn(missing_docs)]

mod capability;
mod config;
mod connector;
mod entry;
mod error;
mod reports;

pub use capability::Capability;
pub use config::{CascataConfig, StoreConfig, TtlConfig};
pub use connector::ConnectorKey;
pub use entry::{CacheEntry, CacheStatus, Cached};
pub use error::CascataError;
pub use reports::{AggregateReport, EmptyDefault};

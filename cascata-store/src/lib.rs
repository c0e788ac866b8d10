#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

mod memory;
mod sqlite;
mod store;
mod tiered;

pub use crate::memory::MemoryStore;
pub use crate::sqlite::SqliteStore;
pub use crate::store::CacheStore;
pub use crate::tiered::TieredStore;

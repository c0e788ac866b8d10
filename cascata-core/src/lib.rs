//! cascata-core
//!
//! Core types and traits shared across the cascata workspace.
//!
//! - `types`: market payloads (quotes, daily bars, fx rates, calendar rows) and
//!   request types.
//! - `connector`: the `CascataConnector` trait and per-capability provider traits.
//! - `validation`: the tagged `Validation` result every provider validator returns.
//! - `clock`: time source used by the freshness layer.
//!
#![warn(missing_docs)]

/// Time source abstraction.
pub mod clock;
/// Connector capability traits and the primary `CascataConnector` interface.
pub mod connector;
pub mod types;
/// Typed validator outcome.
pub mod validation;

pub use clock::{Clock, SystemClock};
pub use connector::CascataConnector;
pub use types::*;
pub use validation::Validation;

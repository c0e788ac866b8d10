//! cascata-providers
//!
//! HTTP connectors implementing `CascataConnector` against public market-data
//! vendors. Each connector owns one `reqwest` client rooted at a base URL that
//! tests point at a local mock server.
//!
//! | connector                 | auth            | capabilities                    |
//! |---------------------------|-----------------|---------------------------------|
//! | [`YahooConnector`]        | none            | quote, history, forex           |
//! | [`StooqConnector`]        | none            | history                         |
//! | [`FinnhubConnector`]      | `token` query   | quote, earnings, insider-trades |
//! | [`AlphaVantageConnector`] | `apikey` query  | quote, history, forex           |
//! | [`ForexFactoryConnector`] | none            | economic-calendar               |
//!
//! Keyed connectors are built from the environment with `from_env()`; a
//! missing key means the connector is not constructed.
#![warn(missing_docs)]

mod alpha_vantage;
mod finnhub;
mod forex_factory;
/// Shared HTTP client and status mapping.
pub mod http;
mod stooq;
mod yahoo;

use std::sync::Arc;

use cascata_core::{CascataConnector, CascataError};

pub use alpha_vantage::{ALPHA_VANTAGE_API_KEY_ENV, AlphaVantageConnector};
pub use finnhub::{FINNHUB_API_KEY_ENV, FinnhubConnector};
pub use forex_factory::ForexFactoryConnector;
pub use stooq::StooqConnector;
pub use yahoo::YahooConnector;

pub(crate) fn env_key(var: &str) -> Result<String, CascataError> {
    std::env::var(var)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| CascataError::InvalidArg(format!("{var} is not set")))
}

/// Every connector that can be built in this environment, keyless ones first.
///
/// Order: Yahoo, Stooq, Forex Factory, then Finnhub and Alpha Vantage when
/// their keys are present.
#[must_use]
pub fn env_connectors() -> Vec<Arc<dyn CascataConnector>> {
    let mut out: Vec<Arc<dyn CascataConnector>> = vec![
        Arc::new(YahooConnector::new()),
        Arc::new(StooqConnector::new()),
        Arc::new(ForexFactoryConnector::new()),
    ];
    match FinnhubConnector::from_env() {
        Ok(c) => out.push(Arc::new(c)),
        Err(e) => tracing::info!(error = %e, "finnhub connector disabled"),
    }
    match AlphaVantageConnector::from_env() {
        Ok(c) => out.push(Arc::new(c)),
        Err(e) => tracing::info!(error = %e, "alpha-vantage connector disabled"),
    }
    out
}

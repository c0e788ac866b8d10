//! Deterministic connectors for tests and demos.
//!
//! `MockConnector` serves static fixtures for every capability.
//! `DynamicMockConnector` is scripted from the outside through a
//! `DynamicMockController`. `ManualClock` lets tests move time explicitly.

use std::time::Duration;

use async_trait::async_trait;
use cascata_core::connector::{
    CalendarProvider, CascataConnector, EarningsProvider, ForexProvider, HistoryProvider,
    InsiderProvider, QuoteProvider,
};
use cascata_core::{
    CalendarEvent, CascataError, DailyBar, EarningsEvent, EarningsWindow, FxPair, FxRate,
    HistoryRequest, InsiderTrade, Quote,
};

mod clock;
mod dynamic;
mod fixtures;

pub use clock::ManualClock;
pub use dynamic::{DynamicMockConnector, DynamicMockController, MockBehavior};

/// Latency injected for the `TIMEOUT` symbol.
pub const TIMEOUT_SYMBOL_DELAY: Duration = Duration::from_millis(200);

/// Mock connector for CI-safe demos. Provides deterministic data from static fixtures.
///
/// Magic symbols: `FAIL` fails every capability, `TIMEOUT` answers after
/// [`TIMEOUT_SYMBOL_DELAY`], and `BAD` returns a quote with a zero price.
pub struct MockConnector;

impl Default for MockConnector {
    fn default() -> Self {
        Self::new()
    }
}

impl MockConnector {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn not_found(what: &str) -> CascataError {
        CascataError::not_found(what.to_string())
    }

    async fn maybe_fail_or_timeout(
        symbol: &str,
        capability: &'static str,
    ) -> Result<(), CascataError> {
        match symbol {
            "FAIL" => Err(CascataError::unavailable(
                "cascata-mock",
                format!("forced failure: {capability}"),
            )),
            "TIMEOUT" => {
                // The orchestrator may time out first depending on its provider timeout.
                tokio::time::sleep(TIMEOUT_SYMBOL_DELAY).await;
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

impl CascataConnector for MockConnector {
    fn name(&self) -> &'static str {
        "cascata-mock"
    }

    fn vendor(&self) -> &'static str {
        "Mock"
    }

    fn as_quote_provider(&self) -> Option<&dyn QuoteProvider> {
        Some(self as &dyn QuoteProvider)
    }
    fn as_history_provider(&self) -> Option<&dyn HistoryProvider> {
        Some(self as &dyn HistoryProvider)
    }
    fn as_forex_provider(&self) -> Option<&dyn ForexProvider> {
        Some(self as &dyn ForexProvider)
    }
    fn as_calendar_provider(&self) -> Option<&dyn CalendarProvider> {
        Some(self as &dyn CalendarProvider)
    }
    fn as_earnings_provider(&self) -> Option<&dyn EarningsProvider> {
        Some(self as &dyn EarningsProvider)
    }
    fn as_insider_provider(&self) -> Option<&dyn InsiderProvider> {
        Some(self as &dyn InsiderProvider)
    }
}

#[async_trait]
impl QuoteProvider for MockConnector {
    async fn quote(&self, symbol: &str) -> Result<Quote, CascataError> {
        Self::maybe_fail_or_timeout(symbol, "quote").await?;
        fixtures::quotes::by_symbol(symbol)
            .ok_or_else(|| Self::not_found(&format!("quote for {symbol}")))
    }
}

#[async_trait]
impl HistoryProvider for MockConnector {
    async fn history(&self, req: &HistoryRequest) -> Result<Vec<DailyBar>, CascataError> {
        let s = req.symbol();
        Self::maybe_fail_or_timeout(s, "history").await?;
        fixtures::history::by_symbol(s).ok_or_else(|| Self::not_found(&format!("history for {s}")))
    }
}

#[async_trait]
impl ForexProvider for MockConnector {
    async fn fx_rate(&self, pair: &FxPair) -> Result<FxRate, CascataError> {
        fixtures::forex::by_pair(pair).ok_or_else(|| Self::not_found(&format!("rate for {pair}")))
    }
}

#[async_trait]
impl CalendarProvider for MockConnector {
    async fn economic_calendar(&self) -> Result<Vec<CalendarEvent>, CascataError> {
        Ok(fixtures::calendar::this_week())
    }
}

#[async_trait]
impl EarningsProvider for MockConnector {
    async fn earnings(&self, window: &EarningsWindow) -> Result<Vec<EarningsEvent>, CascataError> {
        Ok(fixtures::earnings::within(window))
    }
}

#[async_trait]
impl InsiderProvider for MockConnector {
    async fn insider_trades(&self, symbol: &str) -> Result<Vec<InsiderTrade>, CascataError> {
        Self::maybe_fail_or_timeout(symbol, "insider-trades").await?;
        Ok(fixtures::insider::by_symbol(symbol))
    }
}

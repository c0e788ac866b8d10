use async_trait::async_trait;

use crate::types::{
    CalendarEvent, DailyBar, EarningsEvent, EarningsWindow, FxPair, FxRate, HistoryRequest,
    InsiderTrade, Quote,
};
use crate::{Capability, CascataError, ConnectorKey, Validation};

/// Focused role trait for connectors that provide point-in-time quotes.
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Fetch a quote for a normalized symbol.
    async fn quote(&self, symbol: &str) -> Result<Quote, CascataError>;

    /// Reject quotes without a usable price.
    fn validate_quote(&self, quote: Quote) -> Validation<Quote> {
        let ok = quote.is_sane();
        Validation::check(quote, ok, "price missing or zero")
    }
}

/// Focused role trait for connectors that provide daily OHLCV history.
#[async_trait]
pub trait HistoryProvider: Send + Sync {
    /// Fetch daily bars covering the request's lookback, oldest first.
    async fn history(&self, req: &HistoryRequest) -> Result<Vec<DailyBar>, CascataError>;

    /// Require at least one bar.
    fn validate_history(&self, bars: Vec<DailyBar>) -> Validation<Vec<DailyBar>> {
        let ok = !bars.is_empty();
        Validation::check(bars, ok, "no bars returned")
    }
}

/// Focused role trait for connectors that provide currency rates.
#[async_trait]
pub trait ForexProvider: Send + Sync {
    /// Fetch the latest rate for one pair.
    async fn fx_rate(&self, pair: &FxPair) -> Result<FxRate, CascataError>;

    /// Require a strictly positive rate.
    fn validate_fx_rate(&self, rate: FxRate) -> Validation<FxRate> {
        let ok = rate.price.is_sign_positive() && !rate.price.is_zero();
        Validation::check(rate, ok, "rate missing or non-positive")
    }
}

/// Focused role trait for connectors that provide the weekly economic calendar.
#[async_trait]
pub trait CalendarProvider: Send + Sync {
    /// Fetch this week's releases.
    async fn economic_calendar(&self) -> Result<Vec<CalendarEvent>, CascataError>;

    /// Require at least one row; a trading week always has releases.
    fn validate_calendar(&self, rows: Vec<CalendarEvent>) -> Validation<Vec<CalendarEvent>> {
        let ok = !rows.is_empty();
        Validation::check(rows, ok, "empty calendar")
    }
}

/// Focused role trait for connectors that provide the earnings calendar.
#[async_trait]
pub trait EarningsProvider: Send + Sync {
    /// Fetch scheduled and reported earnings within the window.
    async fn earnings(&self, window: &EarningsWindow) -> Result<Vec<EarningsEvent>, CascataError>;

    /// Require at least one event.
    fn validate_earnings(&self, rows: Vec<EarningsEvent>) -> Validation<Vec<EarningsEvent>> {
        let ok = !rows.is_empty();
        Validation::check(rows, ok, "no earnings in window")
    }
}

/// Focused role trait for connectors that provide insider transactions.
#[async_trait]
pub trait InsiderProvider: Send + Sync {
    /// Fetch recent insider transactions for a symbol.
    async fn insider_trades(&self, symbol: &str) -> Result<Vec<InsiderTrade>, CascataError>;

    /// Accept any decoded list; many symbols legitimately have no filings.
    fn validate_insider_trades(&self, rows: Vec<InsiderTrade>) -> Validation<Vec<InsiderTrade>> {
        Validation::Valid(rows)
    }
}

/// Main connector trait that all upstream strategies implement.
///
/// Capabilities are advertised through the `as_*_provider` accessors; the
/// orchestrator only invokes a connector for a capability when the matching
/// accessor returns `Some`.
pub trait CascataConnector: Send + Sync {
    /// A stable identifier used in priority lists and diagnostics (e.g. "yahoo").
    fn name(&self) -> &'static str;

    /// Canonical connector key constructed from the static name.
    fn key(&self) -> ConnectorKey {
        ConnectorKey::new(self.name())
    }

    /// Human-friendly vendor string.
    fn vendor(&self) -> &'static str {
        "unknown"
    }

    /// Advertise quote capability.
    fn as_quote_provider(&self) -> Option<&dyn QuoteProvider> {
        None
    }

    /// Advertise history capability.
    fn as_history_provider(&self) -> Option<&dyn HistoryProvider> {
        None
    }

    /// Advertise forex capability.
    fn as_forex_provider(&self) -> Option<&dyn ForexProvider> {
        None
    }

    /// Advertise economic calendar capability.
    fn as_calendar_provider(&self) -> Option<&dyn CalendarProvider> {
        None
    }

    /// Advertise earnings calendar capability.
    fn as_earnings_provider(&self) -> Option<&dyn EarningsProvider> {
        None
    }

    /// Advertise insider transactions capability.
    fn as_insider_provider(&self) -> Option<&dyn InsiderProvider> {
        None
    }

    /// Whether the connector advertises `cap`.
    fn supports(&self, cap: Capability) -> bool {
        match cap {
            Capability::Quote => self.as_quote_provider().is_some(),
            Capability::History => self.as_history_provider().is_some(),
            Capability::Forex => self.as_forex_provider().is_some(),
            Capability::EconomicCalendar => self.as_calendar_provider().is_some(),
            Capability::Earnings => self.as_earnings_provider().is_some(),
            Capability::InsiderTrades => self.as_insider_provider().is_some(),
            _ => false,
        }
    }
}

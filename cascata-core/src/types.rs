//! Market payloads and request types, plus re-exports from `cascata-types`.
// Consolidated re-exports so downstream crates can depend on `cascata-core` only

pub use cascata_types::{
    AggregateReport, CacheEntry, CacheStatus, Cached, Capability, CascataConfig, CascataError,
    ConnectorKey, EmptyDefault, StoreConfig, TtlConfig,
};

pub use rust_decimal::Decimal;

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

/// Normalize a user-supplied ticker: trim and uppercase. Returns `None` for blanks.
#[must_use]
pub fn normalize_symbol(raw: &str) -> Option<String> {
    let s = raw.trim();
    if s.is_empty() {
        None
    } else {
        Some(s.to_ascii_uppercase())
    }
}

/// Point-in-time quote for one symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    /// Ticker symbol, uppercased.
    pub symbol: String,
    /// Last traded price.
    pub price: Option<Decimal>,
    /// Absolute change against the previous close.
    pub change: Option<Decimal>,
    /// Percentage change against the previous close.
    pub change_percent: Option<Decimal>,
    /// Session high.
    pub high: Option<Decimal>,
    /// Session low.
    pub low: Option<Decimal>,
    /// Previous session close.
    pub prev_close: Option<Decimal>,
}

impl Quote {
    /// A quote is usable only with a present, nonzero price.
    #[must_use]
    pub fn is_sane(&self) -> bool {
        self.price.is_some_and(|p| !p.is_zero())
    }

    /// Fill `change`/`change_percent` from `price` and `prev_close` when the
    /// upstream omitted them.
    #[must_use]
    pub fn with_derived_change(mut self) -> Self {
        if let (Some(price), Some(prev)) = (self.price, self.prev_close)
            && !prev.is_zero()
        {
            let change = price - prev;
            self.change.get_or_insert(change);
            self.change_percent
                .get_or_insert((change / prev * Decimal::ONE_HUNDRED).round_dp(4));
        }
        self
    }
}

/// Sparse result of a multi-symbol quote fetch.
///
/// Symbols without a valid quote are absent from `quotes` and listed in `missing`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct QuoteBatch {
    /// Symbol to quote, only for symbols that resolved.
    pub quotes: BTreeMap<String, Quote>,
    /// Requested symbols that did not resolve.
    pub missing: Vec<String>,
}

/// One daily OHLCV bar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyBar {
    /// Session date.
    pub date: NaiveDate,
    /// Open.
    pub open: Decimal,
    /// High.
    pub high: Decimal,
    /// Low.
    pub low: Decimal,
    /// Close.
    pub close: Decimal,
    /// Volume, when reported.
    pub volume: Option<u64>,
}

/// Request for daily history.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HistoryRequest {
    symbol: String,
    lookback_days: u32,
}

impl HistoryRequest {
    /// Longest lookback accepted, roughly ten years.
    pub const MAX_LOOKBACK_DAYS: u32 = 3_660;

    /// Build a validated request.
    ///
    /// # Errors
    /// Returns `InvalidArg` for a blank symbol or a lookback outside
    /// `1..=MAX_LOOKBACK_DAYS`.
    pub fn try_new(symbol: &str, lookback_days: u32) -> Result<Self, CascataError> {
        let symbol = normalize_symbol(symbol)
            .ok_or_else(|| CascataError::InvalidArg("symbol must not be empty".into()))?;
        if lookback_days == 0 || lookback_days > Self::MAX_LOOKBACK_DAYS {
            return Err(CascataError::InvalidArg(format!(
                "lookback_days must be within 1..={}, got {lookback_days}",
                Self::MAX_LOOKBACK_DAYS
            )));
        }
        Ok(Self {
            symbol,
            lookback_days,
        })
    }

    /// Normalized symbol.
    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Number of calendar days requested.
    #[must_use]
    pub const fn lookback_days(&self) -> u32 {
        self.lookback_days
    }

    /// First calendar day covered relative to `today`.
    #[must_use]
    pub fn start(&self, today: NaiveDate) -> NaiveDate {
        today
            .checked_sub_days(Days::new(u64::from(self.lookback_days)))
            .unwrap_or(NaiveDate::MIN)
    }
}

/// Currency pair such as `EUR/USD`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FxPair {
    /// Base currency, ISO code.
    pub base: String,
    /// Quote currency, ISO code.
    pub quote: String,
}

impl FxPair {
    /// Concatenated form without separator, e.g. `EURUSD`.
    #[must_use]
    pub fn compact(&self) -> String {
        format!("{}{}", self.base, self.quote)
    }
}

impl fmt::Display for FxPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base, self.quote)
    }
}

impl FromStr for FxPair {
    type Err = CascataError;

    /// Accepts `EUR/USD`, `EUR-USD`, `EURUSD`, and `eurusd`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let cleaned: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '/' | '-' | '_' | ' '))
            .collect::<String>()
            .to_ascii_uppercase();
        if cleaned.len() != 6 || !cleaned.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(CascataError::InvalidArg(format!("invalid currency pair: {s}")));
        }
        Ok(Self {
            base: cleaned[..3].to_string(),
            quote: cleaned[3..].to_string(),
        })
    }
}

/// Rate for one currency pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FxRate {
    /// Pair label, e.g. `EUR/USD`.
    pub pair: String,
    /// Last rate.
    pub price: Decimal,
    /// Percentage change against the previous close.
    pub change_percent: Option<Decimal>,
}

/// Expected market impact of an economic release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Importance {
    /// Market holiday marker.
    Holiday,
    /// Low impact.
    Low,
    /// Medium impact.
    Medium,
    /// High impact.
    High,
}

impl FromStr for Importance {
    type Err = CascataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" => Ok(Self::High),
            "medium" | "moderate" => Ok(Self::Medium),
            "low" | "non-economic" => Ok(Self::Low),
            "holiday" => Ok(Self::Holiday),
            other => Err(CascataError::Data(format!("unknown importance: {other}"))),
        }
    }
}

/// One row of the economic calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    /// Release date.
    pub date: NaiveDate,
    /// Release time (`HH:MM`, UTC) or `None` for all-day/tentative.
    pub time: Option<String>,
    /// Expected impact.
    pub importance: Importance,
    /// Release label, e.g. `CPI m/m`.
    pub label: String,
    /// Country or currency code.
    pub country: Option<String>,
    /// Consensus estimate as published.
    pub estimate: Option<String>,
    /// Previous value as published.
    pub previous: Option<String>,
}

/// Order calendar rows by date, then time, with all-day rows first.
pub fn sort_calendar(rows: &mut [CalendarEvent]) {
    rows.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.time.cmp(&b.time)));
}

/// Date window for the earnings calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EarningsWindow {
    from: NaiveDate,
    to: NaiveDate,
}

impl EarningsWindow {
    /// Longest window accepted.
    pub const MAX_DAYS: i64 = 31;

    /// Build a validated window.
    ///
    /// # Errors
    /// Returns `InvalidArg` when `from > to` or the window exceeds `MAX_DAYS`.
    pub fn try_new(from: NaiveDate, to: NaiveDate) -> Result<Self, CascataError> {
        if from > to {
            return Err(CascataError::InvalidArg(format!(
                "earnings window starts after it ends: {from} > {to}"
            )));
        }
        if (to - from).num_days() > Self::MAX_DAYS {
            return Err(CascataError::InvalidArg(format!(
                "earnings window longer than {} days",
                Self::MAX_DAYS
            )));
        }
        Ok(Self { from, to })
    }

    /// Window starting at `today` and covering the next `days` days.
    ///
    /// # Errors
    /// Same as [`EarningsWindow::try_new`].
    pub fn upcoming(today: NaiveDate, days: u32) -> Result<Self, CascataError> {
        let to = today
            .checked_add_days(Days::new(u64::from(days)))
            .ok_or_else(|| CascataError::InvalidArg("earnings window overflows".into()))?;
        Self::try_new(today, to)
    }

    /// First day, inclusive.
    #[must_use]
    pub const fn from(&self) -> NaiveDate {
        self.from
    }

    /// Last day, inclusive.
    #[must_use]
    pub const fn to(&self) -> NaiveDate {
        self.to
    }
}

/// One scheduled or reported earnings release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EarningsEvent {
    /// Ticker symbol.
    pub symbol: String,
    /// Release date.
    pub date: NaiveDate,
    /// `bmo`, `amc`, `dmh`, or empty.
    pub hour: Option<String>,
    /// Consensus EPS.
    pub eps_estimate: Option<Decimal>,
    /// Reported EPS.
    pub eps_actual: Option<Decimal>,
    /// Consensus revenue.
    pub revenue_estimate: Option<Decimal>,
    /// Reported revenue.
    pub revenue_actual: Option<Decimal>,
}

/// One insider transaction filing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsiderTrade {
    /// Ticker symbol.
    pub symbol: String,
    /// Insider name as filed.
    pub name: String,
    /// Signed share change (negative for sales).
    pub change: i64,
    /// Shares held after the transaction.
    pub shares_held: Option<i64>,
    /// Transaction date.
    pub transaction_date: NaiveDate,
    /// Price per share, when reported.
    pub transaction_price: Option<Decimal>,
    /// SEC transaction code (`P`, `S`, `A`, ...).
    pub transaction_code: Option<String>,
}

//! Stooq daily CSV download.

use async_trait::async_trait;
use cascata_core::connector::{CascataConnector, HistoryProvider};
use cascata_core::{CascataError, ConnectorKey, DailyBar, HistoryRequest};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Deserialize;

use crate::http::{HttpClient, dec_str};

const BASE_URL: &str = "https://stooq.com";

#[derive(Debug, Deserialize)]
struct Row {
    #[serde(rename = "Date")]
    date: NaiveDate,
    #[serde(rename = "Open")]
    open: String,
    #[serde(rename = "High")]
    high: String,
    #[serde(rename = "Low")]
    low: String,
    #[serde(rename = "Close")]
    close: String,
    #[serde(rename = "Volume", default)]
    volume: Option<String>,
}

/// Keyless history-only connector.
///
/// Plain tickers are mapped to Stooq's US listing (`aapl.us`); symbols that
/// already carry a market suffix or an index caret are passed through lowercased.
#[derive(Debug, Clone)]
pub struct StooqConnector {
    http: HttpClient,
}

impl Default for StooqConnector {
    fn default() -> Self {
        Self::new()
    }
}

impl StooqConnector {
    /// Static connector key for orchestrator priority configuration.
    pub const KEY: ConnectorKey = ConnectorKey::new("stooq");

    /// Connector against the public endpoint.
    #[must_use]
    pub fn new() -> Self {
        Self::with_base_url(BASE_URL)
    }

    /// Connector against another host, e.g. a local mock server.
    #[must_use]
    pub fn with_base_url(base: impl Into<String>) -> Self {
        Self {
            http: HttpClient::new(Self::KEY.as_str(), base),
        }
    }

    /// Stooq ticker for a normalized symbol.
    #[must_use]
    pub fn stooq_symbol(symbol: &str) -> String {
        let s = symbol.to_ascii_lowercase();
        if s.contains('.') || s.starts_with('^') {
            s
        } else {
            format!("{s}.us")
        }
    }

    fn parse(&self, body: &str, from: NaiveDate) -> Result<Vec<DailyBar>, CascataError> {
        let trimmed = body.trim();
        if trimmed.is_empty() || trimmed.to_ascii_lowercase().starts_with("no data") {
            return Err(CascataError::invalid_response(self.name(), "no data"));
        }

        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(trimmed.as_bytes());
        let mut bars = Vec::new();
        for rec in rdr.deserialize::<Row>() {
            let row = rec.map_err(|e| {
                CascataError::invalid_response(self.name(), format!("malformed csv: {e}"))
            })?;
            if row.date < from {
                continue;
            }
            let (Some(open), Some(high), Some(low), Some(close)) = (
                dec_str(&row.open),
                dec_str(&row.high),
                dec_str(&row.low),
                dec_str(&row.close),
            ) else {
                tracing::debug!(provider = self.name(), date = %row.date, "skipping row without prices");
                continue;
            };
            let volume = row.volume.as_deref().and_then(parse_volume);
            bars.push(DailyBar {
                date: row.date,
                open,
                high,
                low,
                close,
                volume,
            });
        }

        if bars.is_empty() {
            return Err(CascataError::invalid_response(self.name(), "zero rows"));
        }
        bars.sort_by_key(|b| b.date);
        Ok(bars)
    }
}

/// Volumes are integers, occasionally in exponent form for heavy tickers.
fn parse_volume(s: &str) -> Option<u64> {
    let s = s.trim();
    s.parse::<u64>()
        .ok()
        .or_else(|| s.parse::<f64>().ok().and_then(|f| Decimal::try_from(f).ok()?.trunc().to_u64()))
}

#[async_trait]
impl HistoryProvider for StooqConnector {
    async fn history(&self, req: &HistoryRequest) -> Result<Vec<DailyBar>, CascataError> {
        let today = Utc::now().date_naive();
        let from = req.start(today);
        let (d1, d2) = (from.format("%Y%m%d").to_string(), today.format("%Y%m%d").to_string());
        let sym = Self::stooq_symbol(req.symbol());
        let body = self
            .http
            .get_text(
                "/q/d/l/",
                &[("s", sym.as_str()), ("i", "d"), ("d1", d1.as_str()), ("d2", d2.as_str())],
            )
            .await?;
        self.parse(&body, from)
    }
}

impl CascataConnector for StooqConnector {
    fn name(&self) -> &'static str {
        Self::KEY.as_str()
    }

    fn vendor(&self) -> &'static str {
        "Stooq"
    }

    fn as_history_provider(&self) -> Option<&dyn HistoryProvider> {
        Some(self)
    }
}

//! Yahoo Finance v8 chart API: quotes, daily history, and forex.

use async_trait::async_trait;
use cascata_core::connector::{CascataConnector, ForexProvider, HistoryProvider, QuoteProvider};
use cascata_core::{CascataError, ConnectorKey, DailyBar, FxPair, FxRate, HistoryRequest, Quote};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::http::{HttpClient, dec_f64};

const BASE_URL: &str = "https://query1.finance.yahoo.com";

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: ChartMeta,
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Option<Indicators>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    regular_market_price: Option<f64>,
    chart_previous_close: Option<f64>,
    previous_close: Option<f64>,
    regular_market_day_high: Option<f64>,
    regular_market_day_low: Option<f64>,
    #[serde(default)]
    gmtoffset: i64,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<QuoteSeries>,
}

#[derive(Debug, Default, Deserialize)]
struct QuoteSeries {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<u64>>,
}

/// Keyless connector over Yahoo's chart endpoint.
///
/// Forex pairs are requested as `EURUSD=X`. A non-null `chart.error` or an
/// empty `chart.result` is an invalid response.
#[derive(Debug, Clone)]
pub struct YahooConnector {
    http: HttpClient,
}

impl Default for YahooConnector {
    fn default() -> Self {
        Self::new()
    }
}

impl YahooConnector {
    /// Static connector key for orchestrator priority configuration.
    pub const KEY: ConnectorKey = ConnectorKey::new("yahoo");

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

    async fn chart(&self, symbol: &str, query: &[(&str, &str)]) -> Result<ChartResult, CascataError> {
        let env: ChartEnvelope = self
            .http
            .get_json(&format!("/v8/finance/chart/{symbol}"), query)
            .await?;
        if let Some(err) = env.chart.error {
            let reason = match (err.code, err.description) {
                (Some(c), Some(d)) => format!("{c}: {d}"),
                (c, d) => c.or(d).unwrap_or_else(|| "chart error".into()),
            };
            return Err(CascataError::invalid_response(self.name(), reason));
        }
        env.chart
            .result
            .and_then(|r| r.into_iter().next())
            .ok_or_else(|| CascataError::invalid_response(self.name(), "empty chart result"))
    }
}

fn bars_from(result: &ChartResult) -> Vec<DailyBar> {
    let Some(series) = result.indicators.as_ref().and_then(|i| i.quote.first()) else {
        return Vec::new();
    };
    let at = |v: &[Option<f64>], i: usize| v.get(i).copied().flatten().and_then(dec_f64);

    let mut bars = Vec::with_capacity(result.timestamp.len());
    for (i, ts) in result.timestamp.iter().enumerate() {
        let Some(date) = DateTime::from_timestamp(ts + result.meta.gmtoffset, 0) else {
            continue;
        };
        // Sessions still forming or halted come back as nulls.
        let (Some(open), Some(high), Some(low), Some(close)) = (
            at(&series.open, i),
            at(&series.high, i),
            at(&series.low, i),
            at(&series.close, i),
        ) else {
            continue;
        };
        bars.push(DailyBar {
            date: date.date_naive(),
            open,
            high,
            low,
            close,
            volume: series.volume.get(i).copied().flatten(),
        });
    }
    bars.sort_by_key(|b| b.date);
    bars.dedup_by_key(|b| b.date);
    bars
}

#[async_trait]
impl QuoteProvider for YahooConnector {
    async fn quote(&self, symbol: &str) -> Result<Quote, CascataError> {
        let r = self
            .chart(symbol, &[("range", "1d"), ("interval", "1d")])
            .await?;
        let m = r.meta;
        Ok(Quote {
            symbol: symbol.to_string(),
            price: m.regular_market_price.and_then(dec_f64),
            change: None,
            change_percent: None,
            high: m.regular_market_day_high.and_then(dec_f64),
            low: m.regular_market_day_low.and_then(dec_f64),
            prev_close: m
                .chart_previous_close
                .or(m.previous_close)
                .and_then(dec_f64),
        }
        .with_derived_change())
    }
}

#[async_trait]
impl HistoryProvider for YahooConnector {
    async fn history(&self, req: &HistoryRequest) -> Result<Vec<DailyBar>, CascataError> {
        let now = Utc::now();
        let start = req
            .start(now.date_naive())
            .and_hms_opt(0, 0, 0)
            .map_or(0, |t| t.and_utc().timestamp());
        let (p1, p2) = (start.to_string(), now.timestamp().to_string());
        let r = self
            .chart(
                req.symbol(),
                &[("period1", p1.as_str()), ("period2", p2.as_str()), ("interval", "1d")],
            )
            .await?;
        Ok(bars_from(&r))
    }
}

#[async_trait]
impl ForexProvider for YahooConnector {
    async fn fx_rate(&self, pair: &FxPair) -> Result<FxRate, CascataError> {
        let symbol = format!("{}=X", pair.compact());
        let q = self.quote(&symbol).await?;
        let price = q
            .price
            .ok_or_else(|| CascataError::invalid_response(self.name(), format!("no rate for {pair}")))?;
        Ok(FxRate {
            pair: pair.to_string(),
            price,
            change_percent: q.change_percent,
        })
    }
}

impl CascataConnector for YahooConnector {
    fn name(&self) -> &'static str {
        Self::KEY.as_str()
    }

    fn vendor(&self) -> &'static str {
        "Yahoo Finance"
    }

    fn as_quote_provider(&self) -> Option<&dyn QuoteProvider> {
        Some(self)
    }

    fn as_history_provider(&self) -> Option<&dyn HistoryProvider> {
        Some(self)
    }

    fn as_forex_provider(&self) -> Option<&dyn ForexProvider> {
        Some(self)
    }
}

//! Alpha Vantage query API: quotes, daily history, and exchange rates.
//!
//! Alpha Vantage answers throttling and plan errors with HTTP 200 and a
//! sentinel key (`Note`, `Information`, `Error Message`) instead of data.

use std::collections::BTreeMap;

use async_trait::async_trait;
use cascata_core::connector::{CascataConnector, ForexProvider, HistoryProvider, QuoteProvider};
use cascata_core::{
    CascataError, ConnectorKey, DailyBar, FxPair, FxRate, HistoryRequest, Quote,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::http::{HttpClient, dec_str};

const BASE_URL: &str = "https://www.alphavantage.co";

/// Environment variable holding the API key.
pub const ALPHA_VANTAGE_API_KEY_ENV: &str = "ALPHA_VANTAGE_API_KEY";

/// Lookbacks up to this many days fit in the compact (100 bar) output.
const COMPACT_LOOKBACK_DAYS: u32 = 100;

#[derive(Debug, Deserialize)]
struct GlobalQuote {
    #[serde(rename = "05. price")]
    price: Option<String>,
    #[serde(rename = "03. high")]
    high: Option<String>,
    #[serde(rename = "04. low")]
    low: Option<String>,
    #[serde(rename = "08. previous close")]
    prev_close: Option<String>,
    #[serde(rename = "09. change")]
    change: Option<String>,
    #[serde(rename = "10. change percent")]
    change_percent: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DailyRow {
    #[serde(rename = "1. open")]
    open: String,
    #[serde(rename = "2. high")]
    high: String,
    #[serde(rename = "3. low")]
    low: String,
    #[serde(rename = "4. close")]
    close: String,
    #[serde(rename = "5. volume")]
    volume: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ExchangeRate {
    #[serde(rename = "5. Exchange Rate")]
    rate: String,
}

/// Key-authenticated connector over `/query?function=...`.
#[derive(Debug, Clone)]
pub struct AlphaVantageConnector {
    http: HttpClient,
    api_key: String,
}

impl AlphaVantageConnector {
    /// Static connector key for orchestrator priority configuration.
    pub const KEY: ConnectorKey = ConnectorKey::new("alpha-vantage");

    /// Connector against the public endpoint.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, BASE_URL)
    }

    /// Connector against another host, e.g. a local mock server.
    #[must_use]
    pub fn with_base_url(api_key: impl Into<String>, base: impl Into<String>) -> Self {
        Self {
            http: HttpClient::new(Self::KEY.as_str(), base),
            api_key: api_key.into(),
        }
    }

    /// Build from `ALPHA_VANTAGE_API_KEY`.
    ///
    /// # Errors
    /// Returns `InvalidArg` when the variable is unset or blank.
    pub fn from_env() -> Result<Self, CascataError> {
        crate::env_key(ALPHA_VANTAGE_API_KEY_ENV).map(Self::new)
    }

    /// Run `function` and return the object stored under `field`.
    async fn query<T: DeserializeOwned>(
        &self,
        function: &str,
        params: &[(&str, &str)],
        field: &str,
    ) -> Result<T, CascataError> {
        let mut query = vec![("function", function)];
        query.extend_from_slice(params);
        query.push(("apikey", self.api_key.as_str()));
        let mut body: Value = self.http.get_json("/query", &query).await?;

        self.check_sentinels(&body)?;
        let payload = body
            .get_mut(field)
            .map(Value::take)
            .filter(|v| v.as_object().is_some_and(|o| !o.is_empty()))
            .ok_or_else(|| {
                CascataError::invalid_response(self.name(), format!("missing or empty {field:?}"))
            })?;
        serde_json::from_value(payload).map_err(|e| {
            CascataError::invalid_response(self.name(), format!("undecodable {field:?}: {e}"))
        })
    }

    fn check_sentinels(&self, body: &Value) -> Result<(), CascataError> {
        for key in ["Error Message", "Note", "Information"] {
            if let Some(msg) = body.get(key).and_then(Value::as_str) {
                return Err(CascataError::invalid_response(self.name(), format!("{key}: {msg}")));
            }
        }
        Ok(())
    }
}

fn daily_bars(rows: BTreeMap<String, DailyRow>, from: NaiveDate) -> Vec<DailyBar> {
    rows.into_iter()
        .filter_map(|(day, r)| {
            let date = NaiveDate::parse_from_str(&day, "%Y-%m-%d").ok()?;
            if date < from {
                return None;
            }
            Some(DailyBar {
                date,
                open: dec_str(&r.open)?,
                high: dec_str(&r.high)?,
                low: dec_str(&r.low)?,
                close: dec_str(&r.close)?,
                volume: r.volume.and_then(|v| v.trim().parse().ok()),
            })
        })
        .collect()
}

#[async_trait]
impl QuoteProvider for AlphaVantageConnector {
    async fn quote(&self, symbol: &str) -> Result<Quote, CascataError> {
        let q: GlobalQuote = self
            .query("GLOBAL_QUOTE", &[("symbol", symbol)], "Global Quote")
            .await?;
        let num = |s: Option<String>| s.as_deref().and_then(dec_str);
        Ok(Quote {
            symbol: symbol.to_string(),
            price: num(q.price),
            change: num(q.change),
            change_percent: num(q.change_percent),
            high: num(q.high),
            low: num(q.low),
            prev_close: num(q.prev_close),
        }
        .with_derived_change())
    }
}

#[async_trait]
impl HistoryProvider for AlphaVantageConnector {
    async fn history(&self, req: &HistoryRequest) -> Result<Vec<DailyBar>, CascataError> {
        let size = if req.lookback_days() <= COMPACT_LOOKBACK_DAYS {
            "compact"
        } else {
            "full"
        };
        let rows: BTreeMap<String, DailyRow> = self
            .query(
                "TIME_SERIES_DAILY",
                &[("symbol", req.symbol()), ("outputsize", size)],
                "Time Series (Daily)",
            )
            .await?;
        // Keys are ISO dates, so map order is already oldest first.
        Ok(daily_bars(rows, req.start(Utc::now().date_naive())))
    }
}

#[async_trait]
impl ForexProvider for AlphaVantageConnector {
    async fn fx_rate(&self, pair: &FxPair) -> Result<FxRate, CascataError> {
        let r: ExchangeRate = self
            .query(
                "CURRENCY_EXCHANGE_RATE",
                &[
                    ("from_currency", pair.base.as_str()),
                    ("to_currency", pair.quote.as_str()),
                ],
                "Realtime Currency Exchange Rate",
            )
            .await?;
        let price = dec_str(&r.rate).ok_or_else(|| {
            CascataError::invalid_response(self.name(), format!("unparseable rate {:?}", r.rate))
        })?;
        Ok(FxRate {
            pair: pair.to_string(),
            price,
            change_percent: None,
        })
    }
}

impl CascataConnector for AlphaVantageConnector {
    fn name(&self) -> &'static str {
        Self::KEY.as_str()
    }

    fn vendor(&self) -> &'static str {
        "Alpha Vantage"
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

//! Finnhub REST API: quotes, the earnings calendar, and insider transactions.

use async_trait::async_trait;
use cascata_core::connector::{CascataConnector, EarningsProvider, InsiderProvider, QuoteProvider};
use cascata_core::{
    CascataError, ConnectorKey, EarningsEvent, EarningsWindow, InsiderTrade, Quote,
};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::http::{HttpClient, dec_f64};

const BASE_URL: &str = "https://finnhub.io/api/v1";

/// Environment variable holding the API token.
pub const FINNHUB_API_KEY_ENV: &str = "FINNHUB_API_KEY";

#[derive(Debug, Deserialize)]
struct FinnhubQuote {
    c: Option<f64>,
    d: Option<f64>,
    dp: Option<f64>,
    h: Option<f64>,
    l: Option<f64>,
    pc: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EarningsEnvelope {
    #[serde(default)]
    earnings_calendar: Vec<EarningsRow>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EarningsRow {
    symbol: String,
    date: String,
    hour: Option<String>,
    eps_estimate: Option<f64>,
    eps_actual: Option<f64>,
    revenue_estimate: Option<f64>,
    revenue_actual: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct InsiderEnvelope {
    #[serde(default)]
    data: Vec<InsiderRow>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InsiderRow {
    name: Option<String>,
    share: Option<i64>,
    change: Option<i64>,
    transaction_date: Option<String>,
    transaction_price: Option<f64>,
    transaction_code: Option<String>,
}

fn parse_day(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}

/// Token-authenticated connector. A quote with `c == 0` means the symbol is
/// unknown or outside the plan and is treated as an invalid response.
#[derive(Debug, Clone)]
pub struct FinnhubConnector {
    http: HttpClient,
    token: String,
}

impl FinnhubConnector {
    /// Static connector key for orchestrator priority configuration.
    pub const KEY: ConnectorKey = ConnectorKey::new("finnhub");

    /// Connector against the public endpoint.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_base_url(token, BASE_URL)
    }

    /// Connector against another host, e.g. a local mock server.
    #[must_use]
    pub fn with_base_url(token: impl Into<String>, base: impl Into<String>) -> Self {
        Self {
            http: HttpClient::new(Self::KEY.as_str(), base),
            token: token.into(),
        }
    }

    /// Build from `FINNHUB_API_KEY`.
    ///
    /// # Errors
    /// Returns `InvalidArg` when the variable is unset or blank.
    pub fn from_env() -> Result<Self, CascataError> {
        crate::env_key(FINNHUB_API_KEY_ENV).map(Self::new)
    }

    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<T, CascataError> {
        let mut query = params.to_vec();
        query.push(("token", self.token.as_str()));
        self.http.get_json(path, &query).await
    }
}

#[async_trait]
impl QuoteProvider for FinnhubConnector {
    async fn quote(&self, symbol: &str) -> Result<Quote, CascataError> {
        let q: FinnhubQuote = self.get("/quote", &[("symbol", symbol)]).await?;
        let price = q.c.and_then(dec_f64).filter(|p| !p.is_zero()).ok_or_else(|| {
            CascataError::invalid_response(self.name(), format!("zero price for {symbol}"))
        })?;
        Ok(Quote {
            symbol: symbol.to_string(),
            price: Some(price),
            change: q.d.and_then(dec_f64),
            change_percent: q.dp.and_then(dec_f64),
            high: q.h.and_then(dec_f64),
            low: q.l.and_then(dec_f64),
            prev_close: q.pc.and_then(dec_f64),
        }
        .with_derived_change())
    }
}

#[async_trait]
impl EarningsProvider for FinnhubConnector {
    async fn earnings(&self, window: &EarningsWindow) -> Result<Vec<EarningsEvent>, CascataError> {
        let (from, to) = (window.from().to_string(), window.to().to_string());
        let env: EarningsEnvelope = self
            .get(
                "/calendar/earnings",
                &[("from", from.as_str()), ("to", to.as_str())],
            )
            .await?;
        let mut rows: Vec<EarningsEvent> = env
            .earnings_calendar
            .into_iter()
            .filter_map(|r| {
                let date = parse_day(&r.date)?;
                Some(EarningsEvent {
                    symbol: r.symbol,
                    date,
                    hour: r.hour.filter(|h| !h.trim().is_empty()),
                    eps_estimate: r.eps_estimate.and_then(dec_f64),
                    eps_actual: r.eps_actual.and_then(dec_f64),
                    revenue_estimate: r.revenue_estimate.and_then(dec_f64),
                    revenue_actual: r.revenue_actual.and_then(dec_f64),
                })
            })
            .collect();
        rows.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.symbol.cmp(&b.symbol)));
        Ok(rows)
    }
}

#[async_trait]
impl InsiderProvider for FinnhubConnector {
    async fn insider_trades(&self, symbol: &str) -> Result<Vec<InsiderTrade>, CascataError> {
        let env: InsiderEnvelope = self
            .get("/stock/insider-transactions", &[("symbol", symbol)])
            .await?;
        Ok(env
            .data
            .into_iter()
            .filter_map(|r| {
                let transaction_date = r.transaction_date.as_deref().and_then(parse_day)?;
                Some(InsiderTrade {
                    symbol: symbol.to_string(),
                    name: r.name.unwrap_or_default(),
                    change: r.change.unwrap_or_default(),
                    shares_held: r.share,
                    transaction_date,
                    transaction_price: r.transaction_price.and_then(dec_f64),
                    transaction_code: r.transaction_code.filter(|c| !c.is_empty()),
                })
            })
            .collect())
    }
}

impl CascataConnector for FinnhubConnector {
    fn name(&self) -> &'static str {
        Self::KEY.as_str()
    }

    fn vendor(&self) -> &'static str {
        "Finnhub"
    }

    fn as_quote_provider(&self) -> Option<&dyn QuoteProvider> {
        Some(self)
    }

    fn as_earnings_provider(&self) -> Option<&dyn EarningsProvider> {
        Some(self)
    }

    fn as_insider_provider(&self) -> Option<&dyn InsiderProvider> {
        Some(self)
    }
}

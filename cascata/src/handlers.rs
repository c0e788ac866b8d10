//! Framework-agnostic inbound adapters.
//!
//! Each handler turns an orchestrator outcome into a status code and a JSON
//! body. Degrade-friendly handlers answer 200 with an empty collection when
//! nothing could be produced; hard-failure handlers answer a non-2xx status
//! with an `{"error": ...}` body. Every body is well-formed JSON.

use cascata_core::{
    CacheStatus, Cached, CascataError, EarningsWindow, FxPair, HistoryRequest,
};
use chrono::NaiveDate;
use serde::Serialize;
use serde_json::{Value, json};

use crate::Cascata;
use crate::sections::Aggregator;

/// Status code plus JSON body, ready for any HTTP framework.
#[derive(Debug, Clone, PartialEq)]
pub struct HandlerResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body.
    pub body: Value,
}

impl HandlerResponse {
    fn ok(body: Value) -> Self {
        Self { status: 200, body }
    }

    /// Hard-failure response for `err`.
    #[must_use]
    pub fn error(err: &CascataError) -> Self {
        Self {
            status: err.http_status(),
            body: json!({ "error": err.to_string() }),
        }
    }

    /// True for 2xx statuses.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

fn meta(status: Option<CacheStatus>, fetched_at: Option<String>) -> Value {
    json!({
        "cache": status.map(CacheStatus::as_str),
        "fetchedAt": fetched_at,
        "degraded": status.is_none_or(|s| s == CacheStatus::Stale),
    })
}

fn to_value<T: Serialize>(v: &T) -> Value {
    serde_json::to_value(v).unwrap_or(Value::Null)
}

/// Degrade-friendly envelope: `{field: payload, meta}` or `{field: [], meta}`.
fn degradable<T: Serialize>(field: &str, res: Result<Cached<T>, CascataError>) -> HandlerResponse {
    match res {
        Ok(cached) => HandlerResponse::ok(json!({
            field: to_value(&cached.value),
            "meta": meta(Some(cached.status), Some(cached.fetched_at.to_rfc3339())),
        })),
        Err(CascataError::InvalidArg(msg)) => {
            HandlerResponse::error(&CascataError::InvalidArg(msg))
        }
        Err(e) => {
            tracing::warn!(field, error = %e, "degrading to empty response");
            HandlerResponse::ok(json!({ field: [], "meta": meta(None, None) }))
        }
    }
}

fn split_list(raw: &str) -> Vec<&str> {
    raw.split(',').map(str::trim).filter(|s| !s.is_empty()).collect()
}

/// `GET /quotes?symbols=AAPL,MSFT`: hard-failure.
///
/// Body: `{"quotes": {SYM: quote}, "missing": [SYM], "meta": {...}}`.
pub async fn quotes(cascata: &Cascata, symbols: &str) -> HandlerResponse {
    let list = split_list(symbols);
    match cascata.cached_quotes(&list).await {
        Ok(cached) => HandlerResponse::ok(json!({
            "quotes": to_value(&cached.value.quotes),
            "missing": cached.value.missing,
            "meta": meta(Some(cached.status), Some(cached.fetched_at.to_rfc3339())),
        })),
        Err(e) => HandlerResponse::error(&e),
    }
}

/// `GET /history/{symbol}?days=N`: hard-failure.
pub async fn history(cascata: &Cascata, symbol: &str, lookback_days: u32) -> HandlerResponse {
    let req = match HistoryRequest::try_new(symbol, lookback_days) {
        Ok(r) => r,
        Err(e) => return HandlerResponse::error(&e),
    };
    match cascata.history(&req).await {
        Ok(cached) => HandlerResponse::ok(json!({
            "symbol": req.symbol(),
            "bars": to_value(&cached.value),
            "meta": meta(Some(cached.status), Some(cached.fetched_at.to_rfc3339())),
        })),
        Err(e) => HandlerResponse::error(&e),
    }
}

/// `GET /forex?pairs=EUR/USD,USD/JPY`: degrade-friendly.
pub async fn forex(cascata: &Cascata, pairs: &str) -> HandlerResponse {
    let parsed: Result<Vec<FxPair>, CascataError> =
        split_list(pairs).into_iter().map(str::parse).collect();
    match parsed {
        Ok(p) => degradable("rates", cascata.forex(&p).await),
        Err(e) => HandlerResponse::error(&e),
    }
}

/// `GET /calendar`: degrade-friendly.
pub async fn calendar(cascata: &Cascata) -> HandlerResponse {
    degradable("events", cascata.economic_calendar().await)
}

/// `GET /earnings?from=YYYY-MM-DD&to=YYYY-MM-DD`: degrade-friendly.
pub async fn earnings(cascata: &Cascata, from: &str, to: &str) -> HandlerResponse {
    let parse = |s: &str| {
        NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map_err(|e| CascataError::InvalidArg(format!("invalid date {s:?}: {e}")))
    };
    let window = parse(from)
        .and_then(|f| parse(to).map(|t| (f, t)))
        .and_then(|(f, t)| EarningsWindow::try_new(f, t));
    match window {
        Ok(w) => degradable("earnings", cascata.earnings(&w).await),
        Err(e) => HandlerResponse::error(&e),
    }
}

/// `GET /insider/{symbol}`: degrade-friendly.
pub async fn insider(cascata: &Cascata, symbol: &str) -> HandlerResponse {
    degradable("trades", cascata.insider_trades(symbol).await)
}

/// `GET /sections/{name}`: unknown names are a 404; known sections degrade.
pub async fn section(aggregator: &Aggregator, name: &str) -> HandlerResponse {
    match aggregator.section(name).await {
        Ok(cached) => HandlerResponse::ok(json!({
            "name": name,
            "data": cached.value,
            "meta": meta(Some(cached.status), Some(cached.fetched_at.to_rfc3339())),
        })),
        Err(e @ CascataError::UnknownSection(_)) => HandlerResponse::error(&e),
        Err(e) => {
            tracing::warn!(section = name, error = %e, "degrading section to empty default");
            let empty = aggregator
                .registry()
                .get(name)
                .map_or(Value::Null, |s| s.empty().value());
            HandlerResponse::ok(json!({
                "name": name,
                "data": empty,
                "meta": meta(None, None),
            }))
        }
    }
}

/// `GET /sections`: always 200.
pub async fn aggregate(aggregator: &Aggregator) -> HandlerResponse {
    let report = aggregator.all().await;
    HandlerResponse::ok(to_value(&report))
}

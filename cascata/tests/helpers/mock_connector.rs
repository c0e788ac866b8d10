#![allow(dead_code)]
#![allow(clippy::type_complexity)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use cascata_core::{
    CalendarEvent, CascataConnector, CascataError, DailyBar, EarningsEvent, EarningsWindow,
    FxPair, FxRate, HistoryRequest, InsiderTrade, Quote,
    connector::{
        CalendarProvider, EarningsProvider, ForexProvider, HistoryProvider, InsiderProvider,
        QuoteProvider,
    },
};
use tokio::time::{Duration, sleep};

type QuoteFn = Arc<dyn Fn(&str) -> Result<Quote, CascataError> + Send + Sync>;
type HistoryFn = Arc<dyn Fn(&HistoryRequest) -> Result<Vec<DailyBar>, CascataError> + Send + Sync>;
type ForexFn = Arc<dyn Fn(&FxPair) -> Result<FxRate, CascataError> + Send + Sync>;
type CalendarFn = Arc<dyn Fn() -> Result<Vec<CalendarEvent>, CascataError> + Send + Sync>;
type EarningsFn =
    Arc<dyn Fn(&EarningsWindow) -> Result<Vec<EarningsEvent>, CascataError> + Send + Sync>;
type InsiderFn = Arc<dyn Fn(&str) -> Result<Vec<InsiderTrade>, CascataError> + Send + Sync>;

/// Simple in-memory connector used by integration tests.
///
/// A capability is advertised only when its closure is set. Every invocation
/// bumps `calls`, so tests can assert that a provider was never reached.
pub struct MockConnector {
    pub name: &'static str,
    pub delay: Duration,
    pub calls: AtomicUsize,

    pub quote_fn: Option<QuoteFn>,
    pub history_fn: Option<HistoryFn>,
    pub forex_fn: Option<ForexFn>,
    pub calendar_fn: Option<CalendarFn>,
    pub earnings_fn: Option<EarningsFn>,
    pub insider_fn: Option<InsiderFn>,
}

impl MockConnector {
    pub fn builder() -> MockConnectorBuilder {
        MockConnectorBuilder::new()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn enter(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }
    }
}

impl CascataConnector for MockConnector {
    fn name(&self) -> &'static str {
        self.name
    }

    fn vendor(&self) -> &'static str {
        "TestMock"
    }

    fn as_quote_provider(&self) -> Option<&dyn QuoteProvider> {
        self.quote_fn.as_ref().map(|_| self as &dyn QuoteProvider)
    }

    fn as_history_provider(&self) -> Option<&dyn HistoryProvider> {
        self.history_fn.as_ref().map(|_| self as &dyn HistoryProvider)
    }

    fn as_forex_provider(&self) -> Option<&dyn ForexProvider> {
        self.forex_fn.as_ref().map(|_| self as &dyn ForexProvider)
    }

    fn as_calendar_provider(&self) -> Option<&dyn CalendarProvider> {
        self.calendar_fn.as_ref().map(|_| self as &dyn CalendarProvider)
    }

    fn as_earnings_provider(&self) -> Option<&dyn EarningsProvider> {
        self.earnings_fn.as_ref().map(|_| self as &dyn EarningsProvider)
    }

    fn as_insider_provider(&self) -> Option<&dyn InsiderProvider> {
        self.insider_fn.as_ref().map(|_| self as &dyn InsiderProvider)
    }
}

#[async_trait]
impl QuoteProvider for MockConnector {
    async fn quote(&self, symbol: &str) -> Result<Quote, CascataError> {
        self.enter().await;
        let f = self
            .quote_fn
            .as_ref()
            .ok_or_else(|| CascataError::unsupported("quote"))?;
        let mut q = (f)(symbol)?;
        q.symbol = symbol.to_string();
        Ok(q)
    }
}

#[async_trait]
impl HistoryProvider for MockConnector {
    async fn history(&self, req: &HistoryRequest) -> Result<Vec<DailyBar>, CascataError> {
        self.enter().await;
        let f = self
            .history_fn
            .as_ref()
            .ok_or_else(|| CascataError::unsupported("history"))?;
        (f)(req)
    }
}

#[async_trait]
impl ForexProvider for MockConnector {
    async fn fx_rate(&self, pair: &FxPair) -> Result<FxRate, CascataError> {
        self.enter().await;
        let f = self
            .forex_fn
            .as_ref()
            .ok_or_else(|| CascataError::unsupported("forex"))?;
        (f)(pair)
    }
}

#[async_trait]
impl CalendarProvider for MockConnector {
    async fn economic_calendar(&self) -> Result<Vec<CalendarEvent>, CascataError> {
        self.enter().await;
        let f = self
            .calendar_fn
            .as_ref()
            .ok_or_else(|| CascataError::unsupported("economic-calendar"))?;
        (f)()
    }
}

#[async_trait]
impl EarningsProvider for MockConnector {
    async fn earnings(&self, window: &EarningsWindow) -> Result<Vec<EarningsEvent>, CascataError> {
        self.enter().await;
        let f = self
            .earnings_fn
            .as_ref()
            .ok_or_else(|| CascataError::unsupported("earnings"))?;
        (f)(window)
    }
}

#[async_trait]
impl InsiderProvider for MockConnector {
    async fn insider_trades(&self, symbol: &str) -> Result<Vec<InsiderTrade>, CascataError> {
        self.enter().await;
        let f = self
            .insider_fn
            .as_ref()
            .ok_or_else(|| CascataError::unsupported("insider-trades"))?;
        (f)(symbol)
    }
}

pub struct MockConnectorBuilder {
    inner: MockConnector,
}

impl MockConnectorBuilder {
    pub fn new() -> Self {
        Self {
            inner: MockConnector {
                name: "default_mock",
                delay: Duration::ZERO,
                calls: AtomicUsize::new(0),
                quote_fn: None,
                history_fn: None,
                forex_fn: None,
                calendar_fn: None,
                earnings_fn: None,
                insider_fn: None,
            },
        }
    }

    pub fn name(mut self, name: &'static str) -> Self {
        self.inner.name = name;
        self
    }

    pub fn delay(mut self, d: Duration) -> Self {
        self.inner.delay = d;
        self
    }

    pub fn with_quote_fn<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) -> Result<Quote, CascataError> + Send + Sync + 'static,
    {
        self.inner.quote_fn = Some(Arc::new(f));
        self
    }

    pub fn returns_quote_ok(self, q: Quote) -> Self {
        self.with_quote_fn(move |_| Ok(q.clone()))
    }

    pub fn fails_quote(self, err: CascataError) -> Self {
        self.with_quote_fn(move |_| Err(err.clone()))
    }

    pub fn with_history_fn<F>(mut self, f: F) -> Self
    where
        F: Fn(&HistoryRequest) -> Result<Vec<DailyBar>, CascataError> + Send + Sync + 'static,
    {
        self.inner.history_fn = Some(Arc::new(f));
        self
    }

    pub fn returns_history_ok(self, bars: Vec<DailyBar>) -> Self {
        self.with_history_fn(move |_| Ok(bars.clone()))
    }

    pub fn with_forex_fn<F>(mut self, f: F) -> Self
    where
        F: Fn(&FxPair) -> Result<FxRate, CascataError> + Send + Sync + 'static,
    {
        self.inner.forex_fn = Some(Arc::new(f));
        self
    }

    pub fn with_calendar_fn<F>(mut self, f: F) -> Self
    where
        F: Fn() -> Result<Vec<CalendarEvent>, CascataError> + Send + Sync + 'static,
    {
        self.inner.calendar_fn = Some(Arc::new(f));
        self
    }

    pub fn returns_calendar_ok(self, rows: Vec<CalendarEvent>) -> Self {
        self.with_calendar_fn(move || Ok(rows.clone()))
    }

    pub fn with_earnings_fn<F>(mut self, f: F) -> Self
    where
        F: Fn(&EarningsWindow) -> Result<Vec<EarningsEvent>, CascataError> + Send + Sync + 'static,
    {
        self.inner.earnings_fn = Some(Arc::new(f));
        self
    }

    pub fn with_insider_fn<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) -> Result<Vec<InsiderTrade>, CascataError> + Send + Sync + 'static,
    {
        self.inner.insider_fn = Some(Arc::new(f));
        self
    }

    pub fn build(self) -> Arc<MockConnector> {
        Arc::new(self.inner)
    }
}

/// Convenience constructor for a quote-only mock returning `price` for any symbol.
pub fn m_quote(name: &'static str, price: &str) -> Arc<MockConnector> {
    MockConnector::builder()
        .name(name)
        .returns_quote_ok(crate::helpers::quote_fixture("X", price))
        .build()
}

/// Quote-only mock that serves symbols present in `prices` and `NotFound` otherwise.
pub fn m_quote_map(name: &'static str, prices: &[(&str, &str)]) -> Arc<MockConnector> {
    let map: HashMap<String, Quote> = prices
        .iter()
        .map(|(s, p)| ((*s).to_string(), crate::helpers::quote_fixture(s, p)))
        .collect();
    MockConnector::builder()
        .name(name)
        .with_quote_fn(move |sym| {
            map.get(sym)
                .cloned()
                .ok_or_else(|| CascataError::not_found(format!("quote for {sym}")))
        })
        .build()
}

/// Calendar-only mock returning `rows`.
pub fn m_calendar(name: &'static str, rows: Vec<CalendarEvent>) -> Arc<MockConnector> {
    MockConnector::builder()
        .name(name)
        .returns_calendar_ok(rows)
        .build()
}

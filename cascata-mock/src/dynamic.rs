use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use cascata_core::connector::{
    CalendarProvider, CascataConnector, EarningsProvider, ForexProvider, HistoryProvider,
    InsiderProvider, QuoteProvider,
};
use cascata_core::{
    CalendarEvent, Capability, CascataError, DailyBar, EarningsEvent, EarningsWindow, FxPair,
    FxRate, HistoryRequest, InsiderTrade, Quote, normalize_symbol,
};

/// Instruction for how a method should behave for a given input.
#[derive(Clone)]
pub enum MockBehavior<T> {
    /// Return the provided value immediately.
    Return(T),
    /// Return the provided value after sleeping.
    Delayed(Duration, T),
    /// Fail immediately with the provided error.
    Fail(CascataError),
    /// Hang indefinitely (simulate a timeout).
    Hang,
}

impl<T> MockBehavior<T> {
    async fn play(self, capability: Capability) -> Result<T, CascataError> {
        match self {
            Self::Return(v) => Ok(v),
            Self::Delayed(d, v) => {
                tokio::time::sleep(d).await;
                Ok(v)
            }
            Self::Fail(e) => Err(e),
            Self::Hang => {
                std::future::pending::<()>().await;
                Err(CascataError::unsupported(capability.as_str()))
            }
        }
    }
}

// Single-subject capabilities (calendar) are keyed by the empty string.
const NO_SUBJECT: &str = "";

#[derive(Default)]
struct InternalState {
    quote_rules: HashMap<String, MockBehavior<Quote>>,
    history_rules: HashMap<String, MockBehavior<Vec<DailyBar>>>,
    forex_rules: HashMap<String, MockBehavior<FxRate>>,
    calendar_rules: HashMap<String, MockBehavior<Vec<CalendarEvent>>>,
    earnings_rules: HashMap<String, MockBehavior<Vec<EarningsEvent>>>,
    insider_rules: HashMap<String, MockBehavior<Vec<InsiderTrade>>>,
    calls: HashMap<Capability, usize>,
    subjects: Vec<(Capability, String)>,
}

impl InternalState {
    fn record(&mut self, cap: Capability, subject: &str) {
        *self.calls.entry(cap).or_default() += 1;
        self.subjects.push((cap, subject.to_string()));
    }
}

fn key(symbol: &str) -> String {
    normalize_symbol(symbol).unwrap_or_default()
}

/// Controller handle used by tests to drive the dynamic mock from the outside.
pub struct DynamicMockController {
    state: Arc<Mutex<InternalState>>,
}

impl DynamicMockController {
    /// Set the behavior for `quote` calls for a specific symbol.
    pub async fn set_quote_behavior(&self, symbol: &str, behavior: MockBehavior<Quote>) {
        let mut guard = self.state.lock().await;
        guard.quote_rules.insert(key(symbol), behavior);
    }

    /// Set the behavior for `history` calls for a specific symbol.
    pub async fn set_history_behavior(&self, symbol: &str, behavior: MockBehavior<Vec<DailyBar>>) {
        let mut guard = self.state.lock().await;
        guard.history_rules.insert(key(symbol), behavior);
    }

    /// Set the behavior for `fx_rate` calls for one pair.
    pub async fn set_fx_behavior(&self, pair: &FxPair, behavior: MockBehavior<FxRate>) {
        let mut guard = self.state.lock().await;
        guard.forex_rules.insert(pair.to_string(), behavior);
    }

    /// Set the behavior for `economic_calendar` calls.
    pub async fn set_calendar_behavior(&self, behavior: MockBehavior<Vec<CalendarEvent>>) {
        let mut guard = self.state.lock().await;
        guard.calendar_rules.insert(NO_SUBJECT.to_string(), behavior);
    }

    /// Set the behavior for `earnings` calls, whatever the window.
    pub async fn set_earnings_behavior(&self, behavior: MockBehavior<Vec<EarningsEvent>>) {
        let mut guard = self.state.lock().await;
        guard.earnings_rules.insert(NO_SUBJECT.to_string(), behavior);
    }

    /// Set the behavior for `insider_trades` calls for a specific symbol.
    pub async fn set_insider_behavior(
        &self,
        symbol: &str,
        behavior: MockBehavior<Vec<InsiderTrade>>,
    ) {
        let mut guard = self.state.lock().await;
        guard.insider_rules.insert(key(symbol), behavior);
    }

    /// Number of calls received for `cap`, including failed and hanging ones.
    pub async fn calls(&self, cap: Capability) -> usize {
        let guard = self.state.lock().await;
        guard.calls.get(&cap).copied().unwrap_or_default()
    }

    /// Subjects (symbol, pair, or empty) requested for `cap`, in arrival order.
    pub async fn requested(&self, cap: Capability) -> Vec<String> {
        let guard = self.state.lock().await;
        guard
            .subjects
            .iter()
            .filter(|(c, _)| *c == cap)
            .map(|(_, s)| s.clone())
            .collect()
    }

    /// Clear all configured behaviors and call logs.
    pub async fn clear_all_behaviors(&self) {
        let mut guard = self.state.lock().await;
        *guard = InternalState::default();
    }
}

/// A connector that defers all behavior to an external controller.
///
/// Inputs without a configured behavior fail with `Unsupported`, which the
/// chain treats like any other provider failure.
pub struct DynamicMockConnector {
    name: &'static str,
    capabilities: Vec<Capability>,
    state: Arc<Mutex<InternalState>>,
}

impl DynamicMockConnector {
    /// Create a new dynamic mock connector advertising every capability, and its controller.
    #[must_use]
    pub fn new_with_controller(
        name: &'static str,
    ) -> (Arc<dyn CascataConnector>, DynamicMockController) {
        Self::new_with_capabilities(name, &Capability::ALL)
    }

    /// Create a dynamic mock that only advertises `capabilities`.
    #[must_use]
    pub fn new_with_capabilities(
        name: &'static str,
        capabilities: &[Capability],
    ) -> (Arc<dyn CascataConnector>, DynamicMockController) {
        let state = Arc::new(Mutex::new(InternalState::default()));
        let controller = DynamicMockController {
            state: Arc::clone(&state),
        };
        let me = Arc::new(Self {
            name,
            capabilities: capabilities.to_vec(),
            state,
        });
        (me as Arc<dyn CascataConnector>, controller)
    }

    fn advertises(&self, cap: Capability) -> bool {
        self.capabilities.contains(&cap)
    }

    /// Log the call and take a snapshot of the configured behavior without
    /// holding the lock across the behavior's await points.
    async fn behavior<T: Clone>(
        &self,
        cap: Capability,
        subject: &str,
        rules: impl FnOnce(&InternalState) -> &HashMap<String, MockBehavior<T>>,
    ) -> Result<T, CascataError> {
        let behavior = {
            let mut guard = self.state.lock().await;
            guard.record(cap, subject);
            rules(&guard).get(subject).cloned()
        };
        match behavior {
            Some(b) => b.play(cap).await,
            None => Err(CascataError::unsupported(cap.as_str())),
        }
    }
}

impl CascataConnector for DynamicMockConnector {
    fn name(&self) -> &'static str {
        self.name
    }

    fn vendor(&self) -> &'static str {
        "DynamicMock"
    }

    fn as_quote_provider(&self) -> Option<&dyn QuoteProvider> {
        self.advertises(Capability::Quote)
            .then_some(self as &dyn QuoteProvider)
    }

    fn as_history_provider(&self) -> Option<&dyn HistoryProvider> {
        self.advertises(Capability::History)
            .then_some(self as &dyn HistoryProvider)
    }

    fn as_forex_provider(&self) -> Option<&dyn ForexProvider> {
        self.advertises(Capability::Forex)
            .then_some(self as &dyn ForexProvider)
    }

    fn as_calendar_provider(&self) -> Option<&dyn CalendarProvider> {
        self.advertises(Capability::EconomicCalendar)
            .then_some(self as &dyn CalendarProvider)
    }

    fn as_earnings_provider(&self) -> Option<&dyn EarningsProvider> {
        self.advertises(Capability::Earnings)
            .then_some(self as &dyn EarningsProvider)
    }

    fn as_insider_provider(&self) -> Option<&dyn InsiderProvider> {
        self.advertises(Capability::InsiderTrades)
            .then_some(self as &dyn InsiderProvider)
    }
}

#[async_trait]
impl QuoteProvider for DynamicMockConnector {
    async fn quote(&self, symbol: &str) -> Result<Quote, CascataError> {
        self.behavior(Capability::Quote, &key(symbol), |s| &s.quote_rules)
            .await
    }
}

#[async_trait]
impl HistoryProvider for DynamicMockConnector {
    async fn history(&self, req: &HistoryRequest) -> Result<Vec<DailyBar>, CascataError> {
        self.behavior(Capability::History, req.symbol(), |s| &s.history_rules)
            .await
    }
}

#[async_trait]
impl ForexProvider for DynamicMockConnector {
    async fn fx_rate(&self, pair: &FxPair) -> Result<FxRate, CascataError> {
        self.behavior(Capability::Forex, &pair.to_string(), |s| &s.forex_rules)
            .await
    }
}

#[async_trait]
impl CalendarProvider for DynamicMockConnector {
    async fn economic_calendar(&self) -> Result<Vec<CalendarEvent>, CascataError> {
        self.behavior(Capability::EconomicCalendar, NO_SUBJECT, |s| {
            &s.calendar_rules
        })
        .await
    }
}

#[async_trait]
impl EarningsProvider for DynamicMockConnector {
    async fn earnings(&self, _window: &EarningsWindow) -> Result<Vec<EarningsEvent>, CascataError> {
        self.behavior(Capability::Earnings, NO_SUBJECT, |s| &s.earnings_rules)
            .await
    }
}

#[async_trait]
impl InsiderProvider for DynamicMockConnector {
    async fn insider_trades(&self, symbol: &str) -> Result<Vec<InsiderTrade>, CascataError> {
        self.behavior(Capability::InsiderTrades, &key(symbol), |s| {
            &s.insider_rules
        })
        .await
    }
}

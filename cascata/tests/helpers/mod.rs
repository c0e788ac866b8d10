// Re-export helpers so tests can `use helpers::*;`
pub mod mock_connector;

#[allow(unused_imports)]
pub use mock_connector::{MockConnector, m_calendar, m_quote, m_quote_map};

use std::sync::Arc;

use cascata::{Cascata, CascataBuilder, Clock, MemoryStore};
use cascata_core::{CalendarEvent, DailyBar, Decimal, Importance, Quote};
use cascata_mock::ManualClock;

/// Common symbol constants used across tests.
pub const AAPL: &str = "AAPL";
pub const MSFT: &str = "MSFT";
#[allow(dead_code)]
pub const GOOG: &str = "GOOG";
#[allow(dead_code)]
pub const BAD: &str = "BAD";

/// Build a decimal from a short literal without unwrap noise in tests.
pub fn d(s: &str) -> Decimal {
    s.parse().expect("valid decimal literal")
}

/// Create a minimal Quote with only `symbol` and `price` populated.
pub fn quote_fixture(symbol: &str, price: &str) -> Quote {
    Quote {
        symbol: symbol.to_string(),
        price: Some(d(price)),
        change: None,
        change_percent: None,
        high: None,
        low: None,
        prev_close: None,
    }
}

/// Daily bar on 2024-01-`day` closing at `close`.
#[allow(dead_code)]
pub fn bar(day: u32, close: &str) -> DailyBar {
    let c = d(close);
    DailyBar {
        date: chrono::NaiveDate::from_ymd_opt(2024, 1, day).expect("valid day"),
        open: c,
        high: c,
        low: c,
        close: c,
        volume: None,
    }
}

/// One high-importance calendar row on 2024-01-`day`.
#[allow(dead_code)]
pub fn event(day: u32, time: Option<&str>, label: &str) -> CalendarEvent {
    CalendarEvent {
        date: chrono::NaiveDate::from_ymd_opt(2024, 1, day).expect("valid day"),
        time: time.map(str::to_string),
        importance: Importance::High,
        label: label.to_string(),
        country: Some("USD".to_string()),
        estimate: None,
        previous: None,
    }
}

/// Builder over a private memory store and a manual clock, so each test is isolated
/// and controls time.
pub fn builder_with_clock() -> (CascataBuilder, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::default());
    let b = Cascata::builder()
        .store(Arc::new(MemoryStore::default()))
        .clock(Arc::clone(&clock) as Arc<dyn Clock>);
    (b, clock)
}

/// Orchestrator over the given connectors in registration order.
#[allow(dead_code)]
pub fn cascata_with(connectors: &[Arc<MockConnector>]) -> (Cascata, Arc<ManualClock>) {
    let (mut b, clock) = builder_with_clock();
    for c in connectors {
        b = b.with_connector(Arc::clone(c) as Arc<dyn cascata::CascataConnector>);
    }
    (b.build().expect("at least one connector"), clock)
}

use cascata_core::{EarningsEvent, EarningsWindow};
use chrono::Days;

use super::dec;

/// Scheduled releases laid out from the first day of `window`, clamped to its last day.
pub fn within(window: &EarningsWindow) -> Vec<EarningsEvent> {
    let rows = [
        ("AAPL", 0, "amc", dec(210, 2), dec(117_150, 0)),
        ("MSFT", 1, "amc", dec(278, 2), dec(61_120, 0)),
        ("KO", 3, "bmo", dec(49, 2), dec(10_660, 0)),
    ];
    rows.into_iter()
        .filter_map(|(symbol, offset, hour, eps, revenue_mm)| {
            let date = window.from().checked_add_days(Days::new(offset))?;
            Some(EarningsEvent {
                symbol: symbol.to_string(),
                date: date.min(window.to()),
                hour: Some(hour.to_string()),
                eps_estimate: Some(eps),
                eps_actual: None,
                revenue_estimate: Some(revenue_mm * dec(1_000_000, 0)),
                revenue_actual: None,
            })
        })
        .collect()
}

use cascata_core::{CalendarEvent, Importance};
use chrono::NaiveDate;

pub fn this_week() -> Vec<CalendarEvent> {
    let rows = [
        (8, Some("12:30"), Importance::High, "CPI m/m", "USD", Some("0.3%"), Some("0.4%")),
        (8, None, Importance::Holiday, "Bank Holiday", "JPY", None, None),
        (9, Some("08:00"), Importance::Medium, "German ZEW Economic Sentiment", "EUR", Some("12.0"), Some("9.8")),
        (10, Some("18:00"), Importance::High, "FOMC Statement", "USD", None, None),
        (11, Some("12:30"), Importance::Low, "Unemployment Claims", "USD", Some("215K"), Some("211K")),
    ];
    rows.into_iter()
        .filter_map(|(day, time, importance, label, country, estimate, previous)| {
            Some(CalendarEvent {
                date: NaiveDate::from_ymd_opt(2024, 1, day)?,
                time: time.map(str::to_string),
                importance,
                label: label.to_string(),
                country: Some(country.to_string()),
                estimate: estimate.map(str::to_string),
                previous: previous.map(str::to_string),
            })
        })
        .collect()
}

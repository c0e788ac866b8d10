//! Forex Factory weekly economic calendar feed.

use async_trait::async_trait;
use cascata_core::connector::{CalendarProvider, CascataConnector};
use cascata_core::{CalendarEvent, CascataError, ConnectorKey, Importance, sort_calendar};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::http::HttpClient;

const BASE_URL: &str = "https://nfs.faireconomy.media";
const THIS_WEEK: &str = "/ff_calendar_thisweek.json";

#[derive(Debug, Deserialize)]
struct FeedRow {
    title: String,
    country: Option<String>,
    date: String,
    impact: Option<String>,
    forecast: Option<String>,
    previous: Option<String>,
}

fn non_blank(s: Option<String>) -> Option<String> {
    s.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Keyless calendar connector. The feed is a bare JSON array; anything else
/// is an invalid response.
#[derive(Debug, Clone)]
pub struct ForexFactoryConnector {
    http: HttpClient,
}

impl Default for ForexFactoryConnector {
    fn default() -> Self {
        Self::new()
    }
}

impl ForexFactoryConnector {
    /// Static connector key for orchestrator priority configuration.
    pub const KEY: ConnectorKey = ConnectorKey::new("forex-factory");

    /// Connector against the public feed.
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

    fn rows(&self, body: Value) -> Result<Vec<CalendarEvent>, CascataError> {
        let Value::Array(items) = body else {
            return Err(CascataError::invalid_response(self.name(), "calendar feed is not an array"));
        };
        let mut rows = Vec::with_capacity(items.len());
        for item in items {
            let row: FeedRow = match serde_json::from_value(item) {
                Ok(r) => r,
                Err(e) => {
                    tracing::debug!(provider = self.name(), error = %e, "skipping calendar row");
                    continue;
                }
            };
            let Ok(at) = DateTime::parse_from_rfc3339(&row.date) else {
                tracing::debug!(provider = self.name(), date = %row.date, "skipping row with bad date");
                continue;
            };
            let at = at.with_timezone(&Utc);
            let importance = row
                .impact
                .as_deref()
                .and_then(|i| i.parse().ok())
                .unwrap_or(Importance::Low);
            // Holidays are listed at midnight but apply to the whole day.
            let time = (importance != Importance::Holiday).then(|| at.format("%H:%M").to_string());
            rows.push(CalendarEvent {
                date: at.date_naive(),
                time,
                importance,
                label: row.title,
                country: non_blank(row.country),
                estimate: non_blank(row.forecast),
                previous: non_blank(row.previous),
            });
        }
        sort_calendar(&mut rows);
        Ok(rows)
    }
}

#[async_trait]
impl CalendarProvider for ForexFactoryConnector {
    async fn economic_calendar(&self) -> Result<Vec<CalendarEvent>, CascataError> {
        let body: Value = self.http.get_json(THIS_WEEK, &[]).await?;
        self.rows(body)
    }
}

impl CascataConnector for ForexFactoryConnector {
    fn name(&self) -> &'static str {
        Self::KEY.as_str()
    }

    fn vendor(&self) -> &'static str {
        "Forex Factory"
    }

    fn as_calendar_provider(&self) -> Option<&dyn CalendarProvider> {
        Some(self)
    }
}

use cascata_core::{CalendarEvent, Cached, Capability, CascataError, sort_calendar};

use crate::Cascata;
use crate::router::macros::provider_call;

impl Cascata {
    /// This week's economic calendar, cached under `calendar:v1:week`.
    ///
    /// Rows are ordered by date, then time, with all-day rows first.
    ///
    /// # Errors
    /// Returns `NoDataAvailable` when every provider failed and nothing was cached.
    #[tracing::instrument(target = "cascata::router", skip(self))]
    pub async fn economic_calendar(&self) -> Result<Cached<Vec<CalendarEvent>>, CascataError> {
        let cap = Capability::EconomicCalendar;
        self.freshness
            .cache_or("calendar:v1:week", self.ttl(cap), || async {
                let mut rows = self
                    .fetch_chain(
                        cap,
                        provider_call! {
                            accessor: as_calendar_provider,
                            validate: validate_calendar,
                            capability: cap,
                            clone: [],
                            call: |p| p.economic_calendar(),
                        },
                    )
                    .await?;
                sort_calendar(&mut rows);
                Ok(rows)
            })
            .await
    }
}

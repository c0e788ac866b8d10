use cascata_core::{Cached, Capability, CascataError, EarningsEvent, EarningsWindow};

use crate::Cascata;
use crate::router::macros::provider_call;

impl Cascata {
    /// Earnings calendar for a window, cached under `earnings:v1:{FROM}:{TO}`.
    ///
    /// Events are ordered by date, then symbol.
    ///
    /// # Errors
    /// Returns `NoDataAvailable` when every provider failed and nothing was cached.
    #[tracing::instrument(
        target = "cascata::router",
        skip_all,
        fields(from = %window.from(), to = %window.to()),
    )]
    pub async fn earnings(
        &self,
        window: &EarningsWindow,
    ) -> Result<Cached<Vec<EarningsEvent>>, CascataError> {
        let key = format!("earnings:v1:{}:{}", window.from(), window.to());
        let window = *window;
        self.freshness
            .cache_or(&key, self.ttl(Capability::Earnings), || async {
                let mut rows = self
                    .fetch_chain(
                        Capability::Earnings,
                        provider_call! {
                            accessor: as_earnings_provider,
                            validate: validate_earnings,
                            capability: Capability::Earnings,
                            clone: [],
                            call: |p| p.earnings(&window),
                        },
                    )
                    .await?;
                rows.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.symbol.cmp(&b.symbol)));
                Ok(rows)
            })
            .await
    }
}

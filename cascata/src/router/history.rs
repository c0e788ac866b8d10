use cascata_core::{Cached, Capability, CascataError, DailyBar, HistoryRequest};

use crate::Cascata;
use crate::router::macros::provider_call;

impl Cascata {
    /// Daily OHLCV history, cached under `history:v1:{SYMBOL}:{LOOKBACK}`.
    ///
    /// Bars come back oldest first with at most one bar per date.
    ///
    /// # Errors
    /// Returns `NoDataAvailable` when every provider failed and nothing was cached.
    #[tracing::instrument(
        target = "cascata::router",
        skip_all,
        fields(symbol = %req.symbol(), lookback = req.lookback_days()),
    )]
    pub async fn history(&self, req: &HistoryRequest) -> Result<Cached<Vec<DailyBar>>, CascataError> {
        let key = format!("history:v1:{}:{}", req.symbol(), req.lookback_days());
        let req = req.clone();
        self.freshness
            .cache_or(&key, self.ttl(Capability::History), || async {
                let mut bars = self
                    .fetch_chain(
                        Capability::History,
                        provider_call! {
                            accessor: as_history_provider,
                            validate: validate_history,
                            capability: Capability::History,
                            clone: [req],
                            call: |p| p.history(&req),
                        },
                    )
                    .await?;
                bars.sort_by_key(|b| b.date);
                bars.dedup_by_key(|b| b.date);
                Ok(bars)
            })
            .await
    }
}

use cascata_core::{Cached, Capability, CascataError, InsiderTrade, normalize_symbol};

use crate::Cascata;
use crate::router::macros::provider_call;

impl Cascata {
    /// Recent insider transactions, cached under `insider:v1:{SYMBOL}`, newest first.
    ///
    /// # Errors
    /// Returns `InvalidArg` for a blank symbol and `NoDataAvailable` when every
    /// provider failed and nothing was cached.
    #[tracing::instrument(target = "cascata::router", skip(self))]
    pub async fn insider_trades(
        &self,
        symbol: &str,
    ) -> Result<Cached<Vec<InsiderTrade>>, CascataError> {
        let symbol = normalize_symbol(symbol)
            .ok_or_else(|| CascataError::InvalidArg("symbol must not be empty".into()))?;
        let key = format!("insider:v1:{symbol}");
        self.freshness
            .cache_or(&key, self.ttl(Capability::InsiderTrades), || async {
                let mut rows = self
                    .fetch_chain(
                        Capability::InsiderTrades,
                        provider_call! {
                            accessor: as_insider_provider,
                            validate: validate_insider_trades,
                            capability: Capability::InsiderTrades,
                            clone: [symbol],
                            call: |p| p.insider_trades(&symbol),
                        },
                    )
                    .await?;
                rows.sort_by(|a, b| b.transaction_date.cmp(&a.transaction_date));
                Ok(rows)
            })
            .await
    }
}

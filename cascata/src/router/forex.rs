use std::collections::BTreeSet;

use cascata_core::{Cached, Capability, CascataError, FxPair, FxRate};

use crate::Cascata;
use crate::router::macros::provider_call;
use crate::router::util::join_with_deadline;

impl Cascata {
    /// Latest rate for one pair through the forex chain. Uncached.
    ///
    /// # Errors
    /// Returns `AllProvidersExhausted` when every provider failed.
    #[tracing::instrument(target = "cascata::router", skip_all, fields(pair = %pair))]
    pub async fn fx_rate(&self, pair: &FxPair) -> Result<FxRate, CascataError> {
        let pair = pair.clone();
        self.fetch_chain(
            Capability::Forex,
            provider_call! {
                accessor: as_forex_provider,
                validate: validate_fx_rate,
                capability: Capability::Forex,
                clone: [pair],
                call: |p| p.fx_rate(&pair),
            },
        )
        .await
    }

    /// Rates for many pairs, cached under `forex:v1:{PAIRS}`.
    ///
    /// Pairs are fanned out like batch quotes: a failing pair is omitted from the
    /// list. A refresh that resolves no pair at all counts as failed.
    ///
    /// # Errors
    /// Returns `InvalidArg` for an empty pair list and `NoDataAvailable` when the
    /// refresh failed with nothing cached.
    #[tracing::instrument(target = "cascata::router", skip_all, fields(pairs = pairs.len()))]
    pub async fn forex(&self, pairs: &[FxPair]) -> Result<Cached<Vec<FxRate>>, CascataError> {
        let unique: BTreeSet<FxPair> = pairs.iter().cloned().collect();
        if unique.is_empty() {
            return Err(CascataError::InvalidArg("no currency pairs requested".into()));
        }
        let key = format!(
            "forex:v1:{}",
            unique.iter().map(ToString::to_string).collect::<Vec<_>>().join(",")
        );

        self.freshness
            .cache_or(&key, self.ttl(Capability::Forex), || async {
                let tasks = unique.iter().map(|pair| (pair.clone(), self.fx_rate(pair)));
                let results =
                    join_with_deadline(tasks, self.cfg.request_timeout, Capability::Forex).await;

                let mut rates = Vec::with_capacity(results.len());
                let mut first_err = None;
                for (pair, res) in results {
                    match res {
                        Ok(rate) => rates.push(rate),
                        Err(e) => {
                            tracing::debug!(%pair, error = %e, "pair unresolved");
                            first_err.get_or_insert(e);
                        }
                    }
                }
                if rates.is_empty() {
                    return Err(first_err.unwrap_or_else(|| CascataError::not_found("forex rates")));
                }
                Ok(rates)
            })
            .await
    }
}

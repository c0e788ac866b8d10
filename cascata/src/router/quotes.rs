use std::collections::BTreeSet;

use cascata_core::{Cached, Capability, CascataError, Quote, QuoteBatch, normalize_symbol};

use crate::Cascata;
use crate::router::macros::provider_call;
use crate::router::util::{join_with_deadline, key_list};

impl Cascata {
    /// Fetch a point-in-time quote for one symbol through the quote chain.
    ///
    /// Uncached; [`Cascata::cached_quotes`] is the cached entry point.
    ///
    /// # Errors
    /// Returns `InvalidArg` for a blank symbol, `Unsupported` when no connector
    /// offers quotes, and `AllProvidersExhausted` when every provider failed.
    #[tracing::instrument(target = "cascata::router", skip(self))]
    pub async fn quote(&self, symbol: &str) -> Result<Quote, CascataError> {
        let symbol = normalize_symbol(symbol)
            .ok_or_else(|| CascataError::InvalidArg("symbol must not be empty".into()))?;
        self.fetch_chain(
            Capability::Quote,
            provider_call! {
                accessor: as_quote_provider,
                validate: validate_quote,
                capability: Capability::Quote,
                clone: [symbol],
                call: |p| p.quote(&symbol),
            },
        )
        .await
    }

    /// Fetch quotes for many symbols concurrently.
    ///
    /// Symbols are trimmed, uppercased, and deduplicated. Each symbol runs its own
    /// chain; one symbol failing never affects the others. A symbol appears in
    /// `quotes` only if its chain succeeded and the quote has a nonzero price;
    /// everything else is listed in `missing`.
    ///
    /// # Errors
    /// Returns `InvalidArg` when no usable symbol was given and
    /// `InsufficientQuotes` when fewer than `min_batch_quotes` symbols resolved.
    #[tracing::instrument(target = "cascata::router", skip_all, fields(requested = symbols.len()))]
    pub async fn quotes<S: AsRef<str>>(&self, symbols: &[S]) -> Result<QuoteBatch, CascataError> {
        let unique: BTreeSet<String> = symbols
            .iter()
            .filter_map(|s| normalize_symbol(s.as_ref()))
            .collect();
        if unique.is_empty() {
            return Err(CascataError::InvalidArg("no symbols requested".into()));
        }

        let tasks = unique.iter().map(|sym| (sym.clone(), self.quote(sym)));
        let results =
            join_with_deadline(tasks, self.cfg.request_timeout, Capability::Quote).await;

        let mut batch = QuoteBatch::default();
        for (sym, res) in results {
            match res {
                Ok(q) if q.is_sane() => {
                    batch.quotes.insert(sym, q);
                }
                Ok(_) => {
                    tracing::debug!(symbol = %sym, "dropping quote without usable price");
                    batch.missing.push(sym);
                }
                Err(e) => {
                    tracing::debug!(symbol = %sym, error = %e, "symbol unresolved");
                    batch.missing.push(sym);
                }
            }
        }

        let required = self.cfg.min_batch_quotes;
        if batch.quotes.len() < required {
            return Err(CascataError::InsufficientQuotes {
                resolved: batch.quotes.len(),
                required,
            });
        }
        Ok(batch)
    }

    /// Cached batch quotes under `quotes:v1:{SYMBOLS}` with the quote TTL.
    ///
    /// A batch that resolves nothing counts as a failed refresh, so an earlier
    /// batch is stale-served rather than overwritten by an empty one.
    ///
    /// # Errors
    /// Returns `InvalidArg` for an empty symbol list and `NoDataAvailable` when
    /// the refresh failed with nothing cached.
    pub async fn cached_quotes<S: AsRef<str>>(
        &self,
        symbols: &[S],
    ) -> Result<Cached<QuoteBatch>, CascataError> {
        let unique: BTreeSet<String> = symbols
            .iter()
            .filter_map(|s| normalize_symbol(s.as_ref()))
            .collect();
        if unique.is_empty() {
            return Err(CascataError::InvalidArg("no symbols requested".into()));
        }
        let key = format!("quotes:v1:{}", key_list(unique.iter().map(String::as_str)));
        let list: Vec<&str> = unique.iter().map(String::as_str).collect();

        self.freshness
            .cache_or(&key, self.ttl(Capability::Quote), || async {
                let batch = self.quotes(&list).await?;
                if batch.quotes.is_empty() {
                    return Err(CascataError::InsufficientQuotes {
                        resolved: 0,
                        required: self.cfg.min_batch_quotes.max(1),
                    });
                }
                Ok(batch)
            })
            .await
    }
}

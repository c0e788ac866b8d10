use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use cascata_core::{
    Capability, CascataConfig, CascataConnector, CascataError, Clock, ConnectorKey, StoreConfig,
    SystemClock, Validation,
};
use cascata_store::{CacheStore, TieredStore};

use crate::chain::ProviderChain;
use crate::freshness::Freshness;
use crate::sections::{Aggregator, SectionRegistry};

/// Orchestrator that routes requests across registered providers and the cache.
pub struct Cascata {
    pub(crate) connectors: Vec<Arc<dyn CascataConnector>>,
    pub(crate) priorities: HashMap<Capability, Vec<ConnectorKey>>,
    pub(crate) cfg: CascataConfig,
    pub(crate) freshness: Freshness,
}

impl std::fmt::Debug for Cascata {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.connectors.iter().map(|c| c.name()).collect();
        f.debug_struct("Cascata")
            .field("connectors", &names)
            .field("cfg", &self.cfg)
            .finish_non_exhaustive()
    }
}

/// Builder for constructing a `Cascata` orchestrator with custom configuration.
pub struct CascataBuilder {
    connectors: Vec<Arc<dyn CascataConnector>>,
    priorities: HashMap<Capability, Vec<ConnectorKey>>,
    cfg: CascataConfig,
    store: Option<Arc<dyn CacheStore>>,
    store_cfg: StoreConfig,
    clock: Arc<dyn Clock>,
}

impl Default for CascataBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CascataBuilder {
    /// Create a new builder with defaults: no connectors, memory-only cache,
    /// 5s provider timeout, no request deadline, no in-flight coalescing.
    #[must_use]
    pub fn new() -> Self {
        Self {
            connectors: vec![],
            priorities: HashMap::new(),
            cfg: CascataConfig::default(),
            store: None,
            store_cfg: StoreConfig::default(),
            clock: Arc::new(SystemClock),
        }
    }

    /// Register a provider connector.
    ///
    /// Registration order is the chain order for every capability that has no
    /// explicit preference set via [`CascataBuilder::prefer_for`].
    #[must_use]
    pub fn with_connector(mut self, c: Arc<dyn CascataConnector>) -> Self {
        self.connectors.push(c);
        self
    }

    /// Set the chain order for one capability.
    ///
    /// Listed connectors come first in the given order; capable connectors that
    /// are not listed keep their registration order after them. Put free or
    /// unthrottled sources ahead of quota-limited ones.
    #[must_use]
    pub fn prefer_for(
        mut self,
        cap: Capability,
        connectors_desc: &[Arc<dyn CascataConnector>],
    ) -> Self {
        let keys: Vec<ConnectorKey> = connectors_desc.iter().map(|c| c.key()).collect();
        self.priorities.insert(cap, keys);
        self
    }

    /// Replace the whole configuration.
    #[must_use]
    pub fn config(mut self, cfg: CascataConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Set the per-provider call timeout.
    #[must_use]
    pub const fn provider_timeout(mut self, timeout: Duration) -> Self {
        self.cfg.provider_timeout = timeout;
        self
    }

    /// Set a deadline for fan-out operations (batch quotes, forex, all sections).
    ///
    /// Members still pending at the deadline are treated as failed.
    #[must_use]
    pub const fn request_timeout(mut self, timeout: Duration) -> Self {
        self.cfg.request_timeout = Some(timeout);
        self
    }

    /// Minimum number of resolved symbols for a batch quote call to succeed.
    #[must_use]
    pub const fn min_batch_quotes(mut self, n: usize) -> Self {
        self.cfg.min_batch_quotes = n;
        self
    }

    /// Serialize concurrent misses on the same cache key.
    #[must_use]
    pub const fn coalesce_inflight(mut self, yes: bool) -> Self {
        self.cfg.coalesce_inflight = yes;
        self
    }

    /// Override the freshness window for one capability.
    #[must_use]
    pub fn ttl(mut self, cap: Capability, ttl: Duration) -> Self {
        self.cfg.ttl.set(cap, ttl);
        self
    }

    /// Use an explicit cache store (shared with other components if cloned).
    #[must_use]
    pub fn store(mut self, store: Arc<dyn CacheStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Build the default tiered store from this configuration.
    ///
    /// Ignored when [`CascataBuilder::store`] is also set.
    #[must_use]
    pub fn store_config(mut self, cfg: StoreConfig) -> Self {
        self.store_cfg = cfg;
        self
    }

    /// Inject the time source used for freshness decisions.
    #[must_use]
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Build the `Cascata` orchestrator.
    ///
    /// # Errors
    /// Returns `InvalidArg` if no connectors have been registered.
    pub fn build(mut self) -> Result<Cascata, CascataError> {
        if self.connectors.is_empty() {
            return Err(CascataError::InvalidArg(
                "no connectors registered; add at least one via with_connector(...)".to_string(),
            ));
        }

        // Drop unknown keys and duplicates from preference lists.
        let known: std::collections::HashSet<&'static str> =
            self.connectors.iter().map(|c| c.name()).collect();
        for v in self.priorities.values_mut() {
            let mut seen = std::collections::HashSet::new();
            v.retain(|k| known.contains(k.as_str()) && seen.insert(k.as_str()));
        }

        let store = self
            .store
            .unwrap_or_else(|| Arc::new(TieredStore::from_config(&self.store_cfg)));
        let freshness = Freshness::new(store, self.clock).with_coalescing(self.cfg.coalesce_inflight);

        Ok(Cascata {
            connectors: self.connectors,
            priorities: self.priorities,
            cfg: self.cfg,
            freshness,
        })
    }
}

/// Attach the provider id to errors that do not already carry one.
pub(crate) fn tag_err(connector: &str, e: CascataError) -> CascataError {
    match e {
        e @ (CascataError::ProviderUnavailable { .. }
        | CascataError::ProviderInvalidResponse { .. }
        | CascataError::ProviderTimeout { .. }
        | CascataError::NotFound { .. }
        | CascataError::AllProvidersExhausted { .. }) => e,
        other => CascataError::unavailable(connector, other.to_string()),
    }
}

impl Cascata {
    /// Start building a new `Cascata` instance.
    ///
    /// ```rust,ignore
    /// let yahoo: Arc<dyn CascataConnector> = Arc::new(YahooConnector::new());
    /// let finnhub: Arc<dyn CascataConnector> = Arc::new(FinnhubConnector::from_env()?);
    ///
    /// let cascata = Cascata::builder()
    ///     .with_connector(yahoo.clone())
    ///     .with_connector(finnhub.clone())
    ///     .prefer_for(Capability::Quote, &[yahoo, finnhub])
    ///     .build()?;
    /// ```
    #[must_use]
    pub fn builder() -> CascataBuilder {
        CascataBuilder::new()
    }

    /// Effective configuration.
    #[must_use]
    pub const fn config(&self) -> &CascataConfig {
        &self.cfg
    }

    /// The freshness layer shared by every endpoint.
    #[must_use]
    pub const fn freshness(&self) -> &Freshness {
        &self.freshness
    }

    /// Bind a section registry to this orchestrator's cache and deadline.
    #[must_use]
    pub fn aggregator(&self, registry: SectionRegistry) -> Aggregator {
        Aggregator::new(Arc::new(registry), self.freshness.clone())
            .with_deadline(self.cfg.request_timeout)
    }

    /// Freshness window for a capability.
    pub(crate) fn ttl(&self, cap: Capability) -> Duration {
        self.cfg.ttl.ttl_for(cap)
    }

    /// Connectors that advertise `cap`, in chain order.
    pub(crate) fn ordered(&self, cap: Capability) -> Vec<Arc<dyn CascataConnector>> {
        let mut out: Vec<(usize, Arc<dyn CascataConnector>)> = self
            .connectors
            .iter()
            .filter(|c| c.supports(cap))
            .cloned()
            .enumerate()
            .collect();
        if let Some(pref) = self.priorities.get(&cap) {
            let pos: HashMap<_, _> = pref
                .iter()
                .enumerate()
                .map(|(i, k)| (k.as_str(), i))
                .collect();
            out.sort_by_key(|(orig_i, c)| {
                (pos.get(c.name()).copied().unwrap_or(usize::MAX), *orig_i)
            });
        }
        out.into_iter().map(|(_, c)| c).collect()
    }

    /// Run the provider chain for `cap` and collapse the outcome into a result.
    #[tracing::instrument(name = "cascata::core::fetch_chain", skip_all, fields(capability = %cap))]
    pub(crate) async fn fetch_chain<T, F, Fut>(&self, cap: Capability, call: F) -> Result<T, CascataError>
    where
        T: Send,
        F: Fn(Arc<dyn CascataConnector>) -> Option<Fut> + Send,
        Fut: std::future::Future<Output = Result<Validation<T>, CascataError>> + Send,
    {
        ProviderChain::new(cap, self.cfg.provider_timeout)
            .run(&self.ordered(cap), call)
            .await
            .into_result(cap)
    }
}

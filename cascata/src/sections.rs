//! Named, independently cached data categories and their aggregation.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use cascata_core::{AggregateReport, CacheStatus, Cached, CascataError, EmptyDefault};
use futures::future::BoxFuture;
use serde_json::Value;

use crate::freshness::Freshness;
use crate::router::util::with_request_deadline;

type SectionFetch = Arc<dyn Fn() -> BoxFuture<'static, Result<Value, CascataError>> + Send + Sync>;

/// One registered section: a fetch, its freshness window, and its empty default.
#[derive(Clone)]
pub struct Section {
    name: String,
    ttl: Duration,
    empty: EmptyDefault,
    fetch: SectionFetch,
}

impl std::fmt::Debug for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Section")
            .field("name", &self.name)
            .field("ttl", &self.ttl)
            .field("empty", &self.empty)
            .finish_non_exhaustive()
    }
}

impl Section {
    /// Section name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Freshness window.
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Value served when the section fails with nothing cached.
    #[must_use]
    pub const fn empty(&self) -> EmptyDefault {
        self.empty
    }

    /// Cache key for this section.
    #[must_use]
    pub fn cache_key(&self) -> String {
        format!("section:{}", self.name)
    }
}

/// Immutable set of sections, in registration order.
#[derive(Debug, Clone, Default)]
pub struct SectionRegistry {
    sections: Vec<Section>,
}

impl SectionRegistry {
    /// Start registering sections.
    #[must_use]
    pub fn builder() -> SectionRegistryBuilder {
        SectionRegistryBuilder::default()
    }

    /// Look up a section by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.name == name)
    }

    /// Registered names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.sections.iter().map(|s| s.name.as_str())
    }

    /// Number of registered sections.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    /// True when nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

/// Builder for [`SectionRegistry`]; the registry is frozen by `build`.
#[derive(Default)]
pub struct SectionRegistryBuilder {
    sections: Vec<Section>,
}

impl SectionRegistryBuilder {
    /// Register a section.
    ///
    /// `fetch` is invoked on every cache miss and must produce a JSON payload.
    #[must_use]
    pub fn section<F, Fut>(
        mut self,
        name: impl Into<String>,
        ttl: Duration,
        empty: EmptyDefault,
        fetch: F,
    ) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, CascataError>> + Send + 'static,
    {
        let fetch: SectionFetch = Arc::new(move || Box::pin(fetch()));
        self.sections.push(Section {
            name: name.into(),
            ttl,
            empty,
            fetch,
        });
        self
    }

    /// Freeze the registry.
    ///
    /// # Errors
    /// Returns `InvalidArg` for an empty or duplicate section name.
    pub fn build(self) -> Result<SectionRegistry, CascataError> {
        let mut seen = std::collections::HashSet::new();
        for s in &self.sections {
            if s.name.trim().is_empty() {
                return Err(CascataError::InvalidArg("section name must not be empty".into()));
            }
            if !seen.insert(s.name.as_str()) {
                return Err(CascataError::InvalidArg(format!(
                    "duplicate section: {}",
                    s.name
                )));
            }
        }
        Ok(SectionRegistry {
            sections: self.sections,
        })
    }
}

/// Serves single sections and the combined report over a shared freshness layer.
#[derive(Debug, Clone)]
pub struct Aggregator {
    registry: Arc<SectionRegistry>,
    freshness: Freshness,
    deadline: Option<Duration>,
}

impl Aggregator {
    /// Aggregator over `registry` with no deadline.
    #[must_use]
    pub const fn new(registry: Arc<SectionRegistry>, freshness: Freshness) -> Self {
        Self {
            registry,
            freshness,
            deadline: None,
        }
    }

    /// Bound each section of [`Aggregator::all`] by `deadline`.
    #[must_use]
    pub const fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }

    /// The registry being served.
    #[must_use]
    pub fn registry(&self) -> &SectionRegistry {
        &self.registry
    }

    /// Fetch one section through `cache_or("section:{name}", fetch, ttl)`.
    ///
    /// # Errors
    /// Returns `UnknownSection` for an unregistered name and `NoDataAvailable`
    /// when the fetch failed with nothing cached.
    #[tracing::instrument(name = "cascata::sections::section", skip(self))]
    pub async fn section(&self, name: &str) -> Result<Cached<Value>, CascataError> {
        let section = self
            .registry
            .get(name)
            .ok_or_else(|| CascataError::UnknownSection(name.to_string()))?;
        self.fetch_section(section, None).await
    }

    /// `deadline` bounds the refresh only, so a timed-out refresh still falls
    /// back to the cached entry.
    async fn fetch_section(
        &self,
        section: &Section,
        deadline: Option<Duration>,
    ) -> Result<Cached<Value>, CascataError> {
        let fetch = Arc::clone(&section.fetch);
        self.freshness
            .cache_or(&section.cache_key(), section.ttl, move || {
                with_request_deadline(deadline, section.name(), fetch())
            })
            .await
    }

    /// Fetch every section concurrently and assemble the report.
    ///
    /// Never fails: a section whose refresh errors or misses the deadline is
    /// served stale when cached (named in `stale`), otherwise holds its empty
    /// default and is named in `degraded`.
    #[tracing::instrument(name = "cascata::sections::all", skip(self), fields(sections = self.registry.len()))]
    pub async fn all(&self) -> AggregateReport {
        let tasks = self.registry.sections.iter().map(|s| async move {
            let res = self.fetch_section(s, self.deadline).await;
            (s, res)
        });
        let results = futures::future::join_all(tasks).await;

        let mut sections = BTreeMap::new();
        let mut degraded = Vec::new();
        let mut stale = Vec::new();
        for (s, res) in results {
            match res {
                Ok(cached) => {
                    if cached.status == CacheStatus::Stale {
                        stale.push(s.name.clone());
                    }
                    sections.insert(s.name.clone(), cached.value);
                }
                Err(e) => {
                    tracing::warn!(section = %s.name, error = %e, "section failed; serving empty default");
                    degraded.push(s.name.clone());
                    sections.insert(s.name.clone(), s.empty.value());
                }
            }
        }

        AggregateReport {
            sections,
            degraded,
            stale,
        }
    }
}

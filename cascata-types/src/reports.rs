//! Report envelopes produced by the aggregator.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Empty value a section falls back to when it fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmptyDefault {
    /// `[]`
    List,
    /// `{}`
    Map,
}

impl EmptyDefault {
    /// Materialize the empty JSON value.
    #[must_use]
    pub fn value(self) -> serde_json::Value {
        match self {
            Self::List => serde_json::Value::Array(Vec::new()),
            Self::Map => serde_json::Value::Object(serde_json::Map::new()),
        }
    }
}

/// Result of fetching every registered section.
///
/// `sections` always has one slot per registered section. Sections whose fetch
/// failed without a cached fallback hold their empty default and are named in
/// `degraded`; sections served from an expired entry are named in `stale`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AggregateReport {
    /// Section name to payload.
    pub sections: BTreeMap<String, serde_json::Value>,
    /// Sections that failed and carry their empty default.
    pub degraded: Vec<String>,
    /// Sections served from an expired cache entry.
    pub stale: Vec<String>,
}

impl AggregateReport {
    /// True when every section was served without degradation or staleness.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.degraded.is_empty() && self.stale.is_empty()
    }
}

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unified error type for the cascata workspace.
///
/// Provider-level variants (`ProviderUnavailable`, `ProviderInvalidResponse`,
/// `ProviderTimeout`) are consumed by the chain executor to drive advancement.
/// Only `AllProvidersExhausted` escapes a chain, and the freshness layer turns it
/// into a stale-serve or `NoDataAvailable`. `CacheStoreUnavailable` never leaves
/// the store/freshness boundary.
///
/// Partial failures of an aggregate or batch are not represented here: they show
/// up as missing keys, empty defaults, and the `degraded`/`missing` lists.
#[derive(Debug, Error, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CascataError {
    /// The requested capability is not implemented by any registered connector.
    #[error("unsupported capability: {capability}")]
    Unsupported {
        /// Capability label (e.g. "quote", "economic-calendar").
        capability: String,
    },

    /// Issues with the returned or expected data (missing fields, bad encodings).
    #[error("data issue: {0}")]
    Data(String),

    /// Invalid input argument.
    #[error("invalid argument: {0}")]
    InvalidArg(String),

    /// Transport or HTTP-level failure talking to an upstream.
    #[error("{provider} unavailable: {msg}")]
    ProviderUnavailable {
        /// Provider id that failed.
        provider: String,
        /// Human-readable error message.
        msg: String,
    },

    /// Upstream answered but the payload is unusable (rate-limit notice, empty set).
    #[error("{provider} returned an unusable response: {reason}")]
    ProviderInvalidResponse {
        /// Provider id that answered.
        provider: String,
        /// Why the payload was rejected.
        reason: String,
    },

    /// An individual provider call exceeded the configured timeout.
    #[error("provider timed out: {capability} via {provider}")]
    ProviderTimeout {
        /// Provider id that timed out.
        provider: String,
        /// Capability label.
        capability: String,
    },

    /// Every provider in a chain failed; carries attempted ids in chain order.
    #[error("all providers exhausted for {capability}: attempted {attempted:?}")]
    AllProvidersExhausted {
        /// Capability label.
        capability: String,
        /// Provider ids in the order they were attempted.
        attempted: Vec<String>,
        /// Per-attempt failures, aligned with `attempted`.
        errors: Vec<CascataError>,
    },

    /// The durable cache backend failed. Always demoted to the in-process tier.
    #[error("cache store unavailable: {0}")]
    CacheStoreUnavailable(String),

    /// A refresh failed and there was no prior entry to serve.
    #[error("no data available for {key}: {cause}")]
    NoDataAvailable {
        /// Cache key that could not be populated.
        key: String,
        /// The refresh failure.
        cause: Box<CascataError>,
    },

    /// A batch resolved fewer symbols than the configured floor.
    #[error("only {resolved} of the required {required} quotes resolved")]
    InsufficientQuotes {
        /// Number of symbols with a valid quote.
        resolved: usize,
        /// Configured minimum.
        required: usize,
    },

    /// A resource or symbol could not be found.
    #[error("not found: {what}")]
    NotFound {
        /// Description of missing resource, e.g. "quote for AAPL".
        what: String,
    },

    /// No section registered under the requested name.
    #[error("unknown section: {0}")]
    UnknownSection(String),

    /// The overall request exceeded the configured deadline.
    #[error("request timed out: {capability}")]
    RequestTimeout {
        /// Capability or section label for which the request timed out.
        capability: String,
    },
}

impl CascataError {
    /// Helper: build an `Unsupported` error for a capability string.
    #[must_use]
    pub fn unsupported(cap: impl Into<String>) -> Self {
        Self::Unsupported {
            capability: cap.into(),
        }
    }

    /// Helper: build a `ProviderUnavailable` error.
    pub fn unavailable(provider: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::ProviderUnavailable {
            provider: provider.into(),
            msg: msg.into(),
        }
    }

    /// Helper: build a `ProviderInvalidResponse` error.
    pub fn invalid_response(provider: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ProviderInvalidResponse {
            provider: provider.into(),
            reason: reason.into(),
        }
    }

    /// Helper: build a `NotFound` error for a description of the missing resource.
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    /// Helper: build a `ProviderTimeout` error.
    pub fn provider_timeout(provider: impl Into<String>, capability: impl Into<String>) -> Self {
        Self::ProviderTimeout {
            provider: provider.into(),
            capability: capability.into(),
        }
    }

    /// Helper: build a `RequestTimeout` error.
    #[must_use]
    pub fn request_timeout(capability: impl Into<String>) -> Self {
        Self::RequestTimeout {
            capability: capability.into(),
        }
    }

    /// Helper: wrap a refresh failure for a key that had no prior entry.
    #[must_use]
    pub fn no_data(key: impl Into<String>, cause: Self) -> Self {
        Self::NoDataAvailable {
            key: key.into(),
            cause: Box::new(cause),
        }
    }

    /// Returns true if this error should be surfaced to users as actionable.
    ///
    /// Capability absence and benign not-found conditions are not actionable.
    /// Aggregates are classified based on their contents.
    #[must_use]
    pub fn is_actionable(&self) -> bool {
        match self {
            Self::Unsupported { .. } | Self::NotFound { .. } => false,
            Self::AllProvidersExhausted { errors, .. } => errors.iter().any(Self::is_actionable),
            Self::NoDataAvailable { cause, .. } => cause.is_actionable(),
            _ => true,
        }
    }

    /// Flatten nested `AllProvidersExhausted` structures into a plain vector.
    #[must_use]
    pub fn flatten(self) -> Vec<Self> {
        match self {
            Self::AllProvidersExhausted { errors, .. } => {
                errors.into_iter().flat_map(Self::flatten).collect()
            }
            other => vec![other],
        }
    }

    /// HTTP status an inbound handler should answer with for this error.
    ///
    /// `NoDataAvailable` answers 502 when every provider was tried and failed
    /// (or too few quotes resolved), and 503 otherwise.
    #[must_use]
    pub fn http_status(&self) -> u16 {
        match self {
            Self::NoDataAvailable { cause, .. }
                if matches!(
                    **cause,
                    Self::AllProvidersExhausted { .. } | Self::InsufficientQuotes { .. }
                ) =>
            {
                cause.http_status()
            }
            Self::InvalidArg(_) => 400,
            Self::NotFound { .. } | Self::UnknownSection(_) => 404,
            Self::Unsupported { .. } => 501,
            Self::NoDataAvailable { .. } | Self::CacheStoreUnavailable(_) => 503,
            Self::ProviderTimeout { .. } | Self::RequestTimeout { .. } => 504,
            Self::ProviderUnavailable { .. }
            | Self::ProviderInvalidResponse { .. }
            | Self::AllProvidersExhausted { .. }
            | Self::InsufficientQuotes { .. }
            | Self::Data(_) => 502,
        }
    }
}

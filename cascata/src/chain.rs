//! Sequential provider waterfall.
//!
//! A chain walks `NotStarted -> Trying(0) -> Trying(1) -> ...` and stops at the
//! first provider whose result validates (`Success`) or after the last provider
//! fails (`Exhausted`). Attempts never overlap: order encodes cost priority.
//! The chain never reads or writes the cache.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use cascata_core::{Capability, CascataConnector, CascataError, Validation};

use crate::core::tag_err;

/// Normalized reason a provider was skipped past.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptFailure {
    /// Transport, HTTP status, or other provider-side error.
    Unavailable(CascataError),
    /// The provider answered but the payload was rejected.
    Invalid(String),
    /// The call exceeded the per-provider timeout.
    TimedOut,
}

/// One failed step of a chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attempt {
    /// Provider id.
    pub provider: &'static str,
    /// Why the chain advanced past it.
    pub failure: AttemptFailure,
}

impl Attempt {
    fn from_error(provider: &'static str, e: CascataError) -> Self {
        let failure = match e {
            CascataError::ProviderTimeout { .. } => AttemptFailure::TimedOut,
            CascataError::ProviderInvalidResponse { reason, .. } => AttemptFailure::Invalid(reason),
            other => AttemptFailure::Unavailable(tag_err(provider, other)),
        };
        Self { provider, failure }
    }

    /// Error form of this attempt, tagged with the provider id.
    #[must_use]
    pub fn to_error(&self, cap: Capability) -> CascataError {
        match &self.failure {
            AttemptFailure::Unavailable(e) => e.clone(),
            AttemptFailure::Invalid(reason) => {
                CascataError::invalid_response(self.provider, reason.clone())
            }
            AttemptFailure::TimedOut => CascataError::provider_timeout(self.provider, cap.as_str()),
        }
    }
}

/// Terminal state of a chain run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainOutcome<T> {
    /// A provider produced a valid payload; later providers were not invoked.
    Success {
        /// The validated payload.
        value: T,
        /// Provider that produced it.
        provider: &'static str,
        /// Position of that provider in the chain.
        index: usize,
    },
    /// Every provider failed; attempts are in chain order.
    Exhausted {
        /// One entry per attempted provider.
        attempts: Vec<Attempt>,
    },
    /// No provider in the chain offers the capability.
    Unsupported,
}

impl<T> ChainOutcome<T> {
    /// Provider ids that were attempted and failed, in order.
    #[must_use]
    pub fn attempted(&self) -> Vec<&'static str> {
        match self {
            Self::Exhausted { attempts } => attempts.iter().map(|a| a.provider).collect(),
            _ => Vec::new(),
        }
    }

    /// Collapse into a result.
    ///
    /// # Errors
    /// `Exhausted` becomes `AllProvidersExhausted` carrying attempted ids and their
    /// errors in chain order; `Unsupported` becomes `Unsupported`.
    pub fn into_result(self, cap: Capability) -> Result<T, CascataError> {
        match self {
            Self::Success { value, .. } => Ok(value),
            Self::Exhausted { attempts } => Err(CascataError::AllProvidersExhausted {
                capability: cap.to_string(),
                attempted: attempts.iter().map(|a| a.provider.to_string()).collect(),
                errors: attempts.iter().map(|a| a.to_error(cap)).collect(),
            }),
            Self::Unsupported => Err(CascataError::unsupported(cap.as_str())),
        }
    }
}

/// Executor for one capability with a fixed per-call timeout.
#[derive(Debug, Clone, Copy)]
pub struct ProviderChain {
    capability: Capability,
    timeout: Duration,
}

impl ProviderChain {
    /// Chain for `capability` bounding each provider call by `timeout`.
    #[must_use]
    pub const fn new(capability: Capability, timeout: Duration) -> Self {
        Self {
            capability,
            timeout,
        }
    }

    /// Wrap a provider future with the timeout and map expiry to `ProviderTimeout`.
    pub async fn call_with_timeout<T, Fut>(
        provider: &'static str,
        capability: Capability,
        timeout: Duration,
        fut: Fut,
    ) -> Result<T, CascataError>
    where
        Fut: Future<Output = Result<T, CascataError>>,
    {
        (tokio::time::timeout(timeout, fut).await)
            .unwrap_or_else(|_| Err(CascataError::provider_timeout(provider, capability.as_str())))
    }

    /// Try `providers` in order.
    ///
    /// `call` returns `None` for a provider that does not offer the capability;
    /// such providers are skipped without being recorded as attempts. Otherwise
    /// its future fetches and validates one payload.
    #[tracing::instrument(
        name = "cascata::chain::run",
        skip(self, providers, call),
        fields(capability = %self.capability, providers = providers.len()),
    )]
    pub async fn run<T, F, Fut>(
        &self,
        providers: &[Arc<dyn CascataConnector>],
        call: F,
    ) -> ChainOutcome<T>
    where
        F: Fn(Arc<dyn CascataConnector>) -> Option<Fut>,
        Fut: Future<Output = Result<Validation<T>, CascataError>>,
    {
        let mut attempts: Vec<Attempt> = Vec::new();
        let mut attempted_any = false;

        for (index, c) in providers.iter().enumerate() {
            let Some(fut) = call(Arc::clone(c)) else {
                continue;
            };
            attempted_any = true;
            let provider = c.name();
            tracing::debug!(provider, index, "trying provider");

            match Self::call_with_timeout(provider, self.capability, self.timeout, fut).await {
                Ok(Validation::Valid(value)) => {
                    tracing::debug!(provider, index, "provider succeeded");
                    return ChainOutcome::Success {
                        value,
                        provider,
                        index,
                    };
                }
                Ok(Validation::Invalid(reason)) => {
                    tracing::debug!(provider, index, %reason, "payload rejected; advancing");
                    attempts.push(Attempt {
                        provider,
                        failure: AttemptFailure::Invalid(reason),
                    });
                }
                Err(e) => {
                    tracing::debug!(provider, index, error = %e, "provider failed; advancing");
                    attempts.push(Attempt::from_error(provider, e));
                }
            }
        }

        if !attempted_any {
            return ChainOutcome::Unsupported;
        }
        tracing::debug!(attempts = attempts.len(), "chain exhausted");
        ChainOutcome::Exhausted { attempts }
    }
}

//! Tagged verdict returned by provider validators.

use crate::CascataError;

/// Outcome of checking a decoded upstream payload.
///
/// `Invalid` covers responses that arrived intact but carry no usable data: a
/// rate-limit notice served with status 200, an empty row set, a zero price.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation<T> {
    /// Payload is usable.
    Valid(T),
    /// Payload is unusable; the reason is kept for diagnostics.
    Invalid(String),
}

impl<T> Validation<T> {
    /// Build `Valid` when `ok` holds, otherwise `Invalid(reason)`.
    pub fn check(value: T, ok: bool, reason: impl Into<String>) -> Self {
        if ok {
            Self::Valid(value)
        } else {
            Self::Invalid(reason.into())
        }
    }

    /// True for `Valid`.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }

    /// Transform the payload of a `Valid` verdict.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Validation<U> {
        match self {
            Self::Valid(v) => Validation::Valid(f(v)),
            Self::Invalid(r) => Validation::Invalid(r),
        }
    }

    /// Convert into a result, tagging an `Invalid` verdict with the provider id.
    ///
    /// # Errors
    /// Returns `ProviderInvalidResponse` for `Invalid`.
    pub fn into_result(self, provider: &str) -> Result<T, CascataError> {
        match self {
            Self::Valid(v) => Ok(v),
            Self::Invalid(reason) => Err(CascataError::invalid_response(provider, reason)),
        }
    }
}

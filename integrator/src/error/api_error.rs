//! Top-level API error type.

use super::{ClientError, ConfigError, DecodeError, RegistryError};
use thiserror::Error;

/// Top-level error type for registry and request operations.
///
/// Each variant wraps one layer of the hierarchy so callers can either
/// propagate with `?` or match on the specific failure.
///
/// ## Examples
///
/// ```rust,ignore
/// use integrator::ApiError;
///
/// fn report(err: ApiError) {
///     match err {
///         ApiError::Config(e) => eprintln!("bad configuration: {e}"),
///         ApiError::Registry(e) => eprintln!("lookup failed: {e}"),
///         ApiError::Client(e) => eprintln!("request failed: {e}"),
///         ApiError::Decode(e) => eprintln!("unreadable response: {e}"),
///     }
/// }
/// ```
#[derive(Debug, Error)]
pub enum ApiError {
    /// Service configuration was rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Registry lookup or registration failed.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Transport failure or non-success HTTP status.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// Response body could not be decoded.
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

impl ApiError {
    /// Returns `true` when a service lookup found no registration.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Registry(RegistryError::NotFound { .. }))
    }

    /// Returns the HTTP status code for status failures.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Client(e) => e.status_code(),
            _ => None,
        }
    }

    /// Returns `true` if repeating the same request could succeed.
    ///
    /// Nothing in this crate retries; the flag is for callers that do.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Client(e) => e.is_retryable(),
            _ => false,
        }
    }
}

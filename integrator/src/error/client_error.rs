//! HTTP client and network errors.

use thiserror::Error;

/// Errors raised while issuing a request.
///
/// Covers transport failures, timeouts, and responses whose status is
/// outside the 2xx range.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Connection or protocol failure before a response arrived.
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    /// The request did not finish within the service timeout.
    #[error("Request timeout after {duration_ms}ms")]
    Timeout {
        /// The configured timeout in milliseconds.
        duration_ms: u64,
    },

    /// Server answered with a non-success status code.
    #[error("HTTP {status}: {message}")]
    Http {
        /// The HTTP status code returned.
        status: u16,
        /// Response body text, or the canonical reason when unreadable.
        message: String,
    },

    /// The request path could not be resolved against the service endpoint.
    #[error("Invalid request path '{path}': {reason}")]
    InvalidPath {
        /// The path as passed by the caller.
        path: String,
        /// Why resolution failed.
        reason: String,
    },

    /// The request body could not be serialized to JSON.
    #[error("Failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),
}

impl ClientError {
    /// Returns `true` if this error is retryable.
    ///
    /// Timeouts and transport failures are, as are 5xx and 429 responses.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout { .. } => true,
            Self::Network(e) => e.is_timeout() || e.is_connect(),
            Self::Http { status, .. } => *status >= 500 || *status == 429,
            Self::InvalidPath { .. } | Self::Encode(_) => false,
        }
    }

    /// Returns the HTTP status code if the server produced one.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub(crate) fn invalid_path(path: &str, reason: impl Into<String>) -> Self {
        Self::InvalidPath {
            path: path.to_string(),
            reason: reason.into(),
        }
    }
}

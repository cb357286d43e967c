//! Service configuration errors.

use thiserror::Error;

/// Errors in a service configuration.
///
/// These surface at registration time, before any request is made.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Service names must contain at least one non-whitespace character.
    #[error("Service name must not be empty")]
    EmptyName,

    /// URL parsing failed.
    #[error("Invalid endpoint URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The endpoint parsed but cannot serve as an HTTP base URL.
    #[error("Unsupported endpoint '{endpoint}': {reason}")]
    UnsupportedEndpoint {
        /// The offending endpoint.
        endpoint: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// A default header name or value is not valid HTTP.
    #[error("Invalid header '{name}'")]
    InvalidHeader {
        /// The header name as configured.
        name: String,
    },

    /// A required environment variable is not set.
    #[error("Missing environment variable: {var}")]
    MissingEnv {
        /// The variable name.
        var: String,
    },

    /// An environment variable is set but unusable.
    #[error("Invalid value in {var}: {message}")]
    InvalidEnv {
        /// The variable name.
        var: String,
        /// What was wrong with it.
        message: String,
    },

    /// A configuration file could not be read.
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// The file that was requested.
        path: std::path::PathBuf,
        /// The underlying I/O failure.
        source: std::io::Error,
    },

    /// YAML configuration document failed to parse.
    #[error("YAML config error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON configuration document failed to parse.
    #[error("JSON config error: {0}")]
    Json(#[from] serde_json::Error),

    /// The underlying HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
}

impl ConfigError {
    /// Creates an unsupported endpoint error.
    pub fn unsupported_endpoint(endpoint: impl ToString, reason: &'static str) -> Self {
        Self::UnsupportedEndpoint {
            endpoint: endpoint.to_string(),
            reason,
        }
    }
}

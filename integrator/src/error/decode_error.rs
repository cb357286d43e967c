//! Response decoding errors.

use thiserror::Error;

/// Errors while turning a successful response body into a value.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// JSON parsing failed.
    #[error("JSON decode error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing failed.
    #[error("YAML decode error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Body was expected to be text but is not valid UTF-8.
    #[error("Response body is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// Empty response body when content was expected.
    #[error("Empty response body")]
    EmptyBody,
}

impl DecodeError {
    /// Returns `true` if a structured parser rejected the body.
    pub fn is_parse_error(&self) -> bool {
        matches!(self, Self::Json(_) | Self::Yaml(_))
    }
}

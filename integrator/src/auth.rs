//! Credentials attached to every request of a service.
//!
//! [`ApiAuth`] is stored in a [`ServiceConfig`](crate::ServiceConfig) and
//! applied by the client just before a request is sent. Secrets are redacted
//! from `Debug` output so configs can be logged safely.

use std::fmt;

use reqwest::RequestBuilder;
use reqwest::header::AUTHORIZATION;
use serde::{Deserialize, Serialize};

/// Placeholder printed in place of secrets.
pub(crate) const REDACTED: &str = "<redacted>";

/// Authentication scheme and credentials for one service.
///
/// In configuration documents the variant is the map key:
///
/// ```yaml
/// auth:
///   basic:
///     username: svc-reporting
///     password: hunter2
/// ```
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiAuth {
    /// HTTP Basic authentication.
    ///
    /// Generates: `Authorization: Basic <base64(username:password)>`
    Basic {
        username: String,
        password: String,
    },

    /// Bearer token.
    ///
    /// Generates: `Authorization: Bearer <token>`
    Bearer { token: String },

    /// Key sent verbatim in a custom header, e.g. `X-API-Key`.
    ApiKey { header: String, key: String },

    /// Key appended to the query string, e.g. `?key=...`.
    QueryParam { name: String, key: String },
}

impl ApiAuth {
    /// Basic credentials from a username and password.
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::Basic {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Short scheme label for logs.
    pub fn scheme(&self) -> &'static str {
        match self {
            Self::Basic { .. } => "basic",
            Self::Bearer { .. } => "bearer",
            Self::ApiKey { .. } => "api_key",
            Self::QueryParam { .. } => "query_param",
        }
    }

    /// Attaches the credentials to an outgoing request.
    ///
    /// `ApiKey` headers and Bearer tokens are checked when the service is registered,
    /// so this never fails.
    pub(crate) fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        match self {
            Self::Basic { username, password } => request.basic_auth(username, Some(password)),
            Self::Bearer { token } => request.header(AUTHORIZATION, format!("Bearer {token}")),
            Self::ApiKey { header, key } => request.header(header.as_str(), key.as_str()),
            Self::QueryParam { name, key } => request.query(&[(name.as_str(), key.as_str())]),
        }
    }
}

impl fmt::Debug for ApiAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &REDACTED)
                .finish(),
            Self::Bearer { .. } => f.debug_struct("Bearer").field("token", &REDACTED).finish(),
            Self::ApiKey { header, .. } => f
                .debug_struct("ApiKey")
                .field("header", header)
                .field("key", &REDACTED)
                .finish(),
            Self::QueryParam { name, .. } => f
                .debug_struct("QueryParam")
                .field("name", name)
                .field("key", &REDACTED)
                .finish(),
        }
    }
}

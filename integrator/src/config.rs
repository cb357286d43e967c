//! Service configuration.
//!
//! A [`ServiceConfig`] describes one remote API: its name, base endpoint,
//! optional credentials, timeout, and default headers. Configs are built in
//! code, read from `{PREFIX}_*` environment variables, or loaded in bulk from
//! a YAML/JSON [`RegistryConfig`] document.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::time::Duration;

use reqwest::header::{AUTHORIZATION, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::auth::{ApiAuth, REDACTED};
use crate::error::ConfigError;

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for one registered service.
///
/// Fields are private: once a config is handed to the registry it is only
/// ever read.
///
/// ## Examples
///
/// ```rust
/// use std::time::Duration;
/// use integrator::ServiceConfig;
///
/// let config = ServiceConfig::new("billing", "https://billing.example.com/v2")?
///     .with_basic_auth("reporting", "hunter2")
///     .with_timeout(Duration::from_secs(5));
///
/// assert_eq!(config.endpoint().as_str(), "https://billing.example.com/v2");
/// # Ok::<(), integrator::ConfigError>(())
/// ```
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConfig {
    name: String,
    endpoint: Url,
    // `auth: {basic: {...}}` in YAML as well as JSON, instead of `!basic` tags
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_yaml::with::singleton_map"
    )]
    auth: Option<ApiAuth>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    timeout_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    headers: BTreeMap<String, String>,
}

impl ServiceConfig {
    /// Creates a config with no credentials and the default timeout.
    ///
    /// ## Errors
    ///
    /// Returns [`ConfigError`] if the name is blank or the endpoint is not an
    /// absolute `http`/`https` URL.
    pub fn new(name: impl Into<String>, endpoint: &str) -> Result<Self, ConfigError> {
        let name = name.into();
        validate_name(&name)?;
        let endpoint = Url::parse(endpoint)?;
        validate_endpoint(&endpoint)?;

        Ok(Self {
            name,
            endpoint,
            auth: None,
            timeout_ms: None,
            headers: BTreeMap::new(),
        })
    }

    /// Reads a config from environment variables named after `prefix`.
    ///
    /// | Variable                 | Meaning                                |
    /// |--------------------------|----------------------------------------|
    /// | `{PREFIX}_ENDPOINT`      | base URL (required)                    |
    /// | `{PREFIX}_USERNAME`      | Basic auth user, needs `_PASSWORD`     |
    /// | `{PREFIX}_PASSWORD`      | Basic auth password                    |
    /// | `{PREFIX}_TOKEN`         | Bearer token, ignored when `_USERNAME` is set |
    /// | `{PREFIX}_TIMEOUT_MS`    | request timeout in milliseconds        |
    ///
    /// Empty variables count as unset.
    pub fn from_env(name: impl Into<String>, prefix: &str) -> Result<Self, ConfigError> {
        let endpoint = required_env(&format!("{prefix}_ENDPOINT"))?;
        let mut config = Self::new(name, &endpoint)?;

        if let Some(username) = optional_env(&format!("{prefix}_USERNAME")) {
            let password = required_env(&format!("{prefix}_PASSWORD"))?;
            config = config.with_basic_auth(username, password);
        } else if let Some(token) = optional_env(&format!("{prefix}_TOKEN")) {
            config = config.with_bearer_token(token);
        }

        let timeout_var = format!("{prefix}_TIMEOUT_MS");
        if let Some(raw) = optional_env(&timeout_var) {
            let millis = raw.trim().parse::<u64>().map_err(|e| ConfigError::InvalidEnv {
                var: timeout_var.clone(),
                message: e.to_string(),
            })?;
            config = config.with_timeout(Duration::from_millis(millis));
        }

        Ok(config)
    }

    /// Sets HTTP Basic credentials.
    pub fn with_basic_auth(self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.with_auth(ApiAuth::basic(username, password))
    }

    /// Sets a bearer token.
    pub fn with_bearer_token(self, token: impl Into<String>) -> Self {
        self.with_auth(ApiAuth::Bearer {
            token: token.into(),
        })
    }

    /// Sends `key` in the `header` header on every request.
    pub fn with_api_key(self, header: impl Into<String>, key: impl Into<String>) -> Self {
        self.with_auth(ApiAuth::ApiKey {
            header: header.into(),
            key: key.into(),
        })
    }

    /// Replaces the credentials.
    pub fn with_auth(mut self, auth: ApiAuth) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Sets the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = Some(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX));
        self
    }

    /// Adds a header sent with every request.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn auth(&self) -> Option<&ApiAuth> {
        self.auth.as_ref()
    }

    /// Per-request timeout, [`DEFAULT_TIMEOUT`] unless overridden.
    pub fn timeout(&self) -> Duration {
        self.timeout_ms
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_TIMEOUT)
    }

    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    /// Checks every invariant a registered config must hold.
    ///
    /// Configs built with [`ServiceConfig::new`] already hold the name and
    /// endpoint invariants; deserialized ones are only checked here.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_name(&self.name)?;
        validate_endpoint(&self.endpoint)?;

        for (name, value) in &self.headers {
            header_pair(name, value)?;
        }
        match &self.auth {
            Some(ApiAuth::ApiKey { header, key }) => {
                header_pair(header, key)?;
            }
            Some(ApiAuth::Bearer { token }) => {
                header_pair(AUTHORIZATION.as_str(), &format!("Bearer {token}"))?;
            }
            Some(ApiAuth::Basic { .. } | ApiAuth::QueryParam { .. }) | None => {}
        }

        Ok(())
    }

    /// Default headers as a typed header map.
    pub(crate) fn header_map(&self) -> Result<reqwest::header::HeaderMap, ConfigError> {
        self.headers
            .iter()
            .map(|(name, value)| header_pair(name, value))
            .collect()
    }
}

impl fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("name", &self.name)
            .field("endpoint", &redacted_url(&self.endpoint))
            .field("auth", &self.auth)
            .field("timeout_ms", &self.timeout_ms)
            .field("headers", &RedactedHeaders(&self.headers))
            .finish()
    }
}

/// Header names only; values may carry secrets.
struct RedactedHeaders<'a>(&'a BTreeMap<String, String>);

impl fmt::Debug for RedactedHeaders<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.0.keys().map(|name| (name, REDACTED)))
            .finish()
    }
}

/// A configuration document listing several services.
///
/// ```yaml
/// services:
///   - name: billing
///     endpoint: https://billing.example.com/v2
///     timeout_ms: 5000
///     auth:
///       basic:
///         username: reporting
///         password: hunter2
///   - name: search
///     endpoint: https://search.example.com
///     headers:
///       X-Tenant: acme
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    #[serde(default)]
    pub services: Vec<ServiceConfig>,
}

impl RegistryConfig {
    pub fn from_yaml_str(input: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(input)?)
    }

    pub fn from_json_str(input: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(input)?)
    }

    /// Loads a document from disk; `.json` files are parsed as JSON, anything
    /// else as YAML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::from_json_str(&content),
            _ => Self::from_yaml_str(&content),
        }
    }
}

pub(crate) fn validate_name(name: &str) -> Result<(), ConfigError> {
    if name.trim().is_empty() {
        return Err(ConfigError::EmptyName);
    }
    Ok(())
}

fn validate_endpoint(endpoint: &Url) -> Result<(), ConfigError> {
    if !matches!(endpoint.scheme(), "http" | "https") {
        return Err(ConfigError::unsupported_endpoint(
            redacted_url(endpoint),
            "scheme must be http or https",
        ));
    }
    if endpoint.cannot_be_a_base() || endpoint.host_str().is_none() {
        return Err(ConfigError::unsupported_endpoint(
            redacted_url(endpoint),
            "missing host",
        ));
    }
    if !endpoint.username().is_empty() || endpoint.password().is_some() {
        return Err(ConfigError::unsupported_endpoint(
            redacted_url(endpoint),
            "credentials belong in auth, not in the URL",
        ));
    }
    Ok(())
}

/// The URL with any `user:password@` part removed.
fn redacted_url(url: &Url) -> String {
    let mut url = url.clone();
    // Both fail only for URLs that cannot carry userinfo in the first place.
    let _ = url.set_username("");
    let _ = url.set_password(None);
    url.to_string()
}

fn header_pair(name: &str, value: &str) -> Result<(HeaderName, HeaderValue), ConfigError> {
    let invalid = || ConfigError::InvalidHeader {
        name: name.to_string(),
    };
    let header_name = HeaderName::try_from(name).map_err(|_| invalid())?;
    let header_value = HeaderValue::try_from(value).map_err(|_| invalid())?;
    Ok((header_name, header_value))
}

fn required_env(var: &str) -> Result<String, ConfigError> {
    optional_env(var).ok_or_else(|| ConfigError::MissingEnv {
        var: var.to_string(),
    })
}

fn optional_env(var: &str) -> Option<String> {
    std::env::var(var).ok().filter(|value| !value.is_empty())
}

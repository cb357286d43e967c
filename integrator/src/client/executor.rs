//! Request execution with tracing instrumentation.

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{Span, debug, instrument};
use url::Url;

use crate::config::ServiceConfig;
use crate::error::{ApiError, ClientError, ConfigError};
use crate::method::RestMethod;
use crate::response::{JsonFormat, ResponseFormat};

use super::TypedClient;

/// Async HTTP client bound to one service configuration.
///
/// All request methods take `&self`; concurrent calls share the underlying
/// connection pool and complete independently of each other.
#[derive(Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    config: ServiceConfig,
    base: Url,
}

impl ApiClient {
    /// Builds a client for `config`.
    ///
    /// ## Errors
    ///
    /// Returns [`ConfigError`] if the config violates an invariant or the
    /// HTTP client cannot be constructed.
    pub fn new(config: ServiceConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .default_headers(config.header_map()?)
            .pool_max_idle_per_host(10)
            .build()
            .map_err(ConfigError::HttpClient)?;

        Ok(Self {
            http,
            base: directory_url(config.endpoint()),
            config,
        })
    }

    /// Name the service was configured with.
    pub fn name(&self) -> &str {
        self.config.name()
    }

    /// The configured endpoint, exactly as given.
    pub fn endpoint(&self) -> &Url {
        self.config.endpoint()
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Views this client with fixed request and response types.
    pub fn typed<Req, Res>(&self) -> TypedClient<'_, Req, Res> {
        TypedClient::new(self)
    }

    /// Sends `GET path` and decodes the JSON response.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.request::<(), T>(RestMethod::Get, path, None).await
    }

    /// Sends `POST path` with `body` as JSON.
    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request(RestMethod::Post, path, Some(body)).await
    }

    /// Sends `PUT path` with `body` as JSON.
    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request(RestMethod::Put, path, Some(body)).await
    }

    /// Sends `PATCH path` with `body` as JSON.
    pub async fn patch<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request(RestMethod::Patch, path, Some(body)).await
    }

    /// Sends `DELETE path`. Use `()` as `T` when the service answers `204`.
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.request::<(), T>(RestMethod::Delete, path, None).await
    }

    /// Sends a request with any method and decodes the JSON response.
    pub async fn request<B, T>(
        &self,
        method: RestMethod,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.fetch::<JsonFormat<T>, B>(method, path, body).await
    }

    /// Sends a request and decodes the response with the format `F`.
    ///
    /// ## Errors
    ///
    /// - [`ClientError::InvalidPath`] if `path` does not resolve under the endpoint
    /// - [`ClientError::Encode`] if `body` fails to serialize
    /// - [`ClientError::Network`] or [`ClientError::Timeout`] on transport failure
    /// - [`ClientError::Http`] for any non-2xx status
    /// - [`DecodeError`](crate::DecodeError) if the body does not parse as `F`
    #[instrument(
        name = "api_request",
        skip(self, body),
        fields(
            service = %self.config.name(),
            http.method = tracing::field::Empty,
            http.url = tracing::field::Empty,
            http.status_code = tracing::field::Empty,
            otel.kind = "client",
            otel.status_code = tracing::field::Empty,
        )
    )]
    pub async fn fetch<F, B>(
        &self,
        method: RestMethod,
        path: &str,
        body: Option<&B>,
    ) -> Result<F::Output, ApiError>
    where
        F: ResponseFormat,
        B: Serialize + ?Sized,
    {
        let span = Span::current();
        span.record("http.method", method.to_string().as_str());

        let url = self.resolve(path)?;
        span.record("http.url", url.as_str());

        let mut request = self
            .http
            .request(method.into(), url)
            .header(ACCEPT, F::accept());

        if let Some(body) = body {
            let payload = serde_json::to_vec(body).map_err(ClientError::Encode)?;
            request = request.header(CONTENT_TYPE, "application/json").body(payload);
        }

        if let Some(auth) = self.config.auth() {
            request = auth.apply(request);
        }

        let response = request.send().await.map_err(|e| self.transport_error(e))?;

        let status = response.status();
        span.record("http.status_code", status.as_u16());

        if !status.is_success() {
            let otel_status = if status.is_server_error() {
                "ERROR"
            } else {
                "UNSET"
            };
            span.record("otel.status_code", otel_status);

            let message = response
                .text()
                .await
                .ok()
                .filter(|text| !text.is_empty())
                .unwrap_or_else(|| status.to_string());
            debug!(status = status.as_u16(), "service returned non-success status");

            return Err(ClientError::Http {
                status: status.as_u16(),
                message,
            }
            .into());
        }

        span.record("otel.status_code", "OK");

        let bytes = response.bytes().await.map_err(|e| self.transport_error(e))?;
        Ok(F::parse(bytes)?)
    }

    /// Resolves `path` beneath the endpoint's path.
    ///
    /// Leading slashes are ignored, so `/users` and `users` both land under
    /// the endpoint, and colons stay inside the segment (`/users:search`).
    /// Absolute URLs and paths that climb out of the endpoint are refused.
    fn resolve(&self, path: &str) -> Result<Url, ClientError> {
        if Url::parse(path).is_ok_and(|url| url.has_host()) {
            return Err(ClientError::invalid_path(path, "absolute URLs are not allowed"));
        }

        // "./" keeps a leading `scheme:` lookalike from being read as a new URL
        let relative = format!("./{}", path.trim_start_matches('/'));
        let url = self
            .base
            .join(&relative)
            .map_err(|e| ClientError::invalid_path(path, e.to_string()))?;

        if url.origin() != self.base.origin() || !url.path().starts_with(self.base.path()) {
            return Err(ClientError::invalid_path(path, "resolves outside the service endpoint"));
        }
        Ok(url)
    }

    fn transport_error(&self, err: reqwest::Error) -> ClientError {
        if err.is_timeout() {
            ClientError::Timeout {
                duration_ms: u64::try_from(self.config.timeout().as_millis()).unwrap_or(u64::MAX),
            }
        } else {
            // the request URL may carry a `QueryParam` key; `http.url` on the span has the path
            ClientError::Network(err.without_url())
        }
    }
}

/// Endpoint with a trailing slash so relative joins append rather than
/// replace the last path segment.
fn directory_url(endpoint: &Url) -> Url {
    let mut base = endpoint.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.set_query(None);
    base.set_fragment(None);
    base
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::error::DecodeError;
    use crate::response::TextFormat;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Debug, PartialEq, serde::Deserialize, serde::Serialize)]
    struct Ticket {
        id: u64,
        title: String,
    }

    fn client_for(server: &MockServer) -> ApiClient {
        let config = ServiceConfig::new("tickets", &server.uri()).unwrap();
        ApiClient::new(config).unwrap()
    }

    fn offline_client(endpoint: &str) -> ApiClient {
        ApiClient::new(ServiceConfig::new("offline", endpoint).unwrap()).unwrap()
    }

    #[test]
    fn test_resolve_appends_to_endpoint_path() {
        let client = offline_client("https://api.example.com/v1");
        assert_eq!(
            client.resolve("/users/7").unwrap().as_str(),
            "https://api.example.com/v1/users/7"
        );
        assert_eq!(
            client.resolve("users?page=2").unwrap().as_str(),
            "https://api.example.com/v1/users?page=2"
        );
    }

    #[test]
    fn test_resolve_keeps_trailing_slash_endpoint() {
        let client = offline_client("https://api.example.com/v1/");
        assert_eq!(
            client.resolve("health").unwrap().as_str(),
            "https://api.example.com/v1/health"
        );
        assert_eq!(client.endpoint().as_str(), "https://api.example.com/v1/");
    }

    #[test]
    fn test_resolve_rejects_absolute_url() {
        let client = offline_client("https://api.example.com");
        for absolute in ["https://elsewhere.example.com/steal", "https:elsewhere.example.com"] {
            let err = client.resolve(absolute).unwrap_err();
            assert!(matches!(err, ClientError::InvalidPath { .. }));
        }
    }

    #[test]
    fn test_resolve_colon_segments_stay_under_endpoint() {
        let client = offline_client("https://api.example.com/v1");
        assert_eq!(
            client.resolve("/users:search").unwrap().as_str(),
            "https://api.example.com/v1/users:search"
        );
        assert_eq!(
            client.resolve("users:search").unwrap().as_str(),
            "https://api.example.com/v1/users:search"
        );

        for sneaky in ["/http:evil.example/steal", "/mailto:x"] {
            let url = client.resolve(sneaky).unwrap();
            assert_eq!(url.host_str(), Some("api.example.com"), "{sneaky} left the service");
            assert!(url.path().starts_with("/v1/"), "{sneaky} resolved to {url}");
        }
    }

    #[test]
    fn test_resolve_rejects_parent_traversal() {
        let client = offline_client("https://api.example.com/v1");
        let err = client.resolve("../admin").unwrap_err();
        assert!(matches!(err, ClientError::InvalidPath { .. }));
    }

    #[tokio::test]
    async fn test_colon_path_reaches_service() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users:search"))
            .and(header("authorization", "Bearer tok-2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let config = ServiceConfig::new("users", &server.uri())
            .unwrap()
            .with_bearer_token("tok-2");
        let client = ApiClient::new(config).unwrap();
        let found: Vec<Ticket> = client.get("/users:search").await.unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn test_resolve_scheme_relative_stays_on_host() {
        let client = offline_client("https://api.example.com");
        let url = client.resolve("//elsewhere.example.com/x").unwrap();
        assert_eq!(url.host_str(), Some("api.example.com"));
    }

    #[tokio::test]
    async fn test_get_json() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/tickets/1"))
            .and(header("accept", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(Ticket {
                id: 1,
                title: "Printer on fire".to_string(),
            }))
            .mount(&server)
            .await;

        let ticket: Ticket = client_for(&server).get("/tickets/1").await.unwrap();
        assert_eq!(ticket.title, "Printer on fire");
    }

    #[tokio::test]
    async fn test_post_sends_json_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/tickets"))
            .and(header("content-type", "application/json"))
            .and(body_json(serde_json::json!({"id": 0, "title": "New"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(Ticket {
                id: 9,
                title: "New".to_string(),
            }))
            .mount(&server)
            .await;

        let draft = Ticket {
            id: 0,
            title: "New".to_string(),
        };
        let created: Ticket = client_for(&server).post("/tickets", &draft).await.unwrap();
        assert_eq!(created.id, 9);
    }

    #[tokio::test]
    async fn test_put_and_patch() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/tickets/3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
            .mount(&server)
            .await;
        Mock::given(method("PATCH"))
            .and(path("/tickets/3"))
            .and(body_json(serde_json::json!({"title": "Renamed"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let put: serde_json::Value = client
            .put("/tickets/3", &serde_json::json!({"id": 3, "title": "Replaced"}))
            .await
            .unwrap();
        assert_eq!(put["ok"], true);

        let patched: serde_json::Value = client
            .patch("/tickets/3", &serde_json::json!({"title": "Renamed"}))
            .await
            .unwrap();
        assert_eq!(patched["ok"], true);
    }

    #[tokio::test]
    async fn test_delete_no_content() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/tickets/4"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let () = client_for(&server).delete("/tickets/4").await.unwrap();
    }

    #[tokio::test]
    async fn test_http_error_carries_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/broken"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .get::<Ticket>("/broken")
            .await
            .unwrap_err();
        assert!(matches!(
            &err,
            ApiError::Client(ClientError::Http { status: 503, message }) if message == "maintenance"
        ));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_http_error_empty_body_uses_reason() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let err = client_for(&server).get::<Ticket>("/me").await.unwrap_err();
        assert!(matches!(
            &err,
            ApiError::Client(ClientError::Http { status: 401, message }) if message.contains("Unauthorized")
        ));
    }

    #[tokio::test]
    async fn test_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{\"id\": \"nope\"}"))
            .mount(&server)
            .await;

        let err = client_for(&server).get::<Ticket>("/tickets/1").await.unwrap_err();
        assert!(matches!(err, ApiError::Decode(DecodeError::Json(_))));
    }

    #[tokio::test]
    async fn test_fetch_text() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .and(header("accept", "text/plain"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .mount(&server)
            .await;

        let body = client_for(&server)
            .fetch::<TextFormat, ()>(RestMethod::Get, "/health", None)
            .await
            .unwrap();
        assert_eq!(body, "ok");
    }

    #[tokio::test]
    async fn test_bearer_and_default_headers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(header("authorization", "Bearer tok-1"))
            .and(header("x-tenant", "acme"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let config = ServiceConfig::new("tickets", &server.uri())
            .unwrap()
            .with_bearer_token("tok-1")
            .with_header("X-Tenant", "acme");
        let client = ApiClient::new(config).unwrap();
        let tickets: Vec<Ticket> = client.get("/tickets").await.unwrap();
        assert!(tickets.is_empty());
    }

    #[tokio::test]
    async fn test_query_param_auth() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("q", "rust"))
            .and(query_param("key", "k-123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"hits": 1})))
            .mount(&server)
            .await;

        let config = ServiceConfig::new("search", &server.uri())
            .unwrap()
            .with_auth(crate::ApiAuth::QueryParam {
                name: "key".to_string(),
                key: "k-123".to_string(),
            });
        let client = ApiClient::new(config).unwrap();
        let hits: serde_json::Value = client.get("/search?q=rust").await.unwrap();
        assert_eq!(hits["hits"], 1);
    }

    #[tokio::test]
    async fn test_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({}))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let config = ServiceConfig::new("slow", &server.uri())
            .unwrap()
            .with_timeout(Duration::from_millis(100));
        let client = ApiClient::new(config).unwrap();

        let err = client.get::<serde_json::Value>("/slow").await.unwrap_err();
        assert!(matches!(
            err,
            ApiError::Client(ClientError::Timeout { duration_ms: 100 })
        ));
    }

    #[tokio::test]
    async fn test_connection_refused_is_network_error() {
        let client = offline_client("http://127.0.0.1:1");
        let err = client.get::<serde_json::Value>("/x").await.unwrap_err();
        assert!(matches!(err, ApiError::Client(ClientError::Network(_))));
    }

    #[tokio::test]
    async fn test_network_error_omits_query_key() {
        let config = ServiceConfig::new("search", "http://127.0.0.1:1")
            .unwrap()
            .with_auth(crate::ApiAuth::QueryParam {
                name: "key".to_string(),
                key: "k-s3cr3t".to_string(),
            });
        let client = ApiClient::new(config).unwrap();
        let err = client.get::<serde_json::Value>("/search").await.unwrap_err();
        assert!(matches!(err, ApiError::Client(ClientError::Network(_))));
        assert!(!format!("{err} {err:?}").contains("k-s3cr3t"));
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config: ServiceConfig =
            serde_json::from_str(r#"{"name": "svc", "endpoint": "ftp://files.example.com"}"#)
                .unwrap();
        assert!(matches!(
            ApiClient::new(config),
            Err(ConfigError::UnsupportedEndpoint { .. })
        ));
    }
}

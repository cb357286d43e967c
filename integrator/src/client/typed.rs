//! Per-service request/response typing.

use std::fmt;
use std::marker::PhantomData;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::ApiError;

use super::ApiClient;

/// An [`ApiClient`] view whose bodies have fixed types.
///
/// `Req` is what the service accepts on `POST`/`PUT`, `Res` what every
/// call returns. Obtained from [`ApiClient::typed`] or
/// [`ServiceRegistry::typed`](crate::ServiceRegistry::typed).
///
/// ```rust,ignore
/// let users = registry.typed::<NewUser, User>("users")?;
/// let created: User = users.post("/users", &NewUser { name: "ada".into() }).await?;
/// let fetched: User = users.get("/users/1").await?;
/// ```
pub struct TypedClient<'a, Req, Res> {
    client: &'a ApiClient,
    _shape: PhantomData<fn(&Req) -> Res>,
}

impl<'a, Req, Res> TypedClient<'a, Req, Res> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self {
            client,
            _shape: PhantomData,
        }
    }

    /// The untyped client underneath.
    pub fn client(&self) -> &'a ApiClient {
        self.client
    }
}

impl<Req, Res> TypedClient<'_, Req, Res>
where
    Req: Serialize,
    Res: DeserializeOwned,
{
    pub async fn get(&self, path: &str) -> Result<Res, ApiError> {
        self.client.get(path).await
    }

    pub async fn post(&self, path: &str, body: &Req) -> Result<Res, ApiError> {
        self.client.post(path, body).await
    }

    pub async fn put(&self, path: &str, body: &Req) -> Result<Res, ApiError> {
        self.client.put(path, body).await
    }

    pub async fn delete(&self, path: &str) -> Result<Res, ApiError> {
        self.client.delete(path).await
    }
}

// PhantomData<fn(&Req) -> Res> is Copy for any Req/Res; derives would add bounds.
impl<Req, Res> Clone for TypedClient<'_, Req, Res> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<Req, Res> Copy for TypedClient<'_, Req, Res> {}

impl<Req, Res> fmt::Debug for TypedClient<'_, Req, Res> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedClient")
            .field("service", &self.client.name())
            .finish()
    }
}

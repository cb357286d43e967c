//! HTTP verbs understood by [`ApiClient`](crate::ApiClient).

use strum::{Display, EnumIter, EnumString};

/// HTTP method of a request issued through a service client.
///
/// ## Examples
///
/// ```rust
/// use integrator::RestMethod;
///
/// let method: RestMethod = "PUT".parse().unwrap();
/// assert_eq!(method, RestMethod::Put);
/// assert_eq!(reqwest::Method::from(method), reqwest::Method::PUT);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString)]
#[strum(serialize_all = "UPPERCASE")]
pub enum RestMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
}

impl From<RestMethod> for reqwest::Method {
    fn from(method: RestMethod) -> Self {
        match method {
            RestMethod::Get => Self::GET,
            RestMethod::Post => Self::POST,
            RestMethod::Put => Self::PUT,
            RestMethod::Patch => Self::PATCH,
            RestMethod::Delete => Self::DELETE,
            RestMethod::Head => Self::HEAD,
        }
    }
}

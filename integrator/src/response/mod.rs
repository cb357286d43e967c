//! Response decoding.
//!
//! A [`ResponseFormat`] turns the body of a 2xx response into a typed value.
//! The verb methods on [`ApiClient`](crate::ApiClient) decode JSON; other
//! formats are reachable through [`ApiClient::fetch`](crate::ApiClient::fetch).

mod format;

pub use format::{BinaryFormat, JsonFormat, ResponseFormat, TextFormat, YamlFormat};

//! Response format trait and implementations.

use std::marker::PhantomData;

use bytes::Bytes;
use serde::de::DeserializeOwned;

use crate::error::DecodeError;

/// Strategy for decoding a response body.
///
/// The implementing type encodes both the parser and the output type, so a
/// call site picks its decoding with a type parameter:
///
/// ```rust,ignore
/// use integrator::response::{JsonFormat, TextFormat};
///
/// let user: User = client.fetch::<JsonFormat<User>, ()>(RestMethod::Get, "/me", None).await?;
/// let health: String = client.fetch::<TextFormat, ()>(RestMethod::Get, "/health", None).await?;
/// ```
pub trait ResponseFormat {
    /// The decoded value.
    type Output;

    /// Parses a response body.
    fn parse(body: Bytes) -> Result<Self::Output, DecodeError>;

    /// Value sent in the `Accept` header.
    fn accept() -> &'static str;
}

/// JSON body deserialized into `T`.
///
/// An empty body is decoded as JSON `null`, so `()` and `Option<T>` accept
/// `204 No Content`. Any other target type reports [`DecodeError::EmptyBody`].
#[derive(Debug, Clone, Copy)]
pub struct JsonFormat<T>(PhantomData<T>);

impl<T: DeserializeOwned> ResponseFormat for JsonFormat<T> {
    type Output = T;

    fn parse(body: Bytes) -> Result<T, DecodeError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return serde_json::from_slice(b"null").map_err(|_| DecodeError::EmptyBody);
        }
        Ok(serde_json::from_slice(&body)?)
    }

    fn accept() -> &'static str {
        "application/json"
    }
}

/// YAML body deserialized into `T`.
#[derive(Debug, Clone, Copy)]
pub struct YamlFormat<T>(PhantomData<T>);

impl<T: DeserializeOwned> ResponseFormat for YamlFormat<T> {
    type Output = T;

    fn parse(body: Bytes) -> Result<T, DecodeError> {
        Ok(serde_yaml::from_slice(&body)?)
    }

    fn accept() -> &'static str {
        "application/yaml"
    }
}

/// UTF-8 text body.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextFormat;

impl ResponseFormat for TextFormat {
    type Output = String;

    fn parse(body: Bytes) -> Result<String, DecodeError> {
        Ok(String::from_utf8(body.to_vec())?)
    }

    fn accept() -> &'static str {
        "text/plain"
    }
}

/// Raw bytes, never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct BinaryFormat;

impl ResponseFormat for BinaryFormat {
    type Output = Bytes;

    fn parse(body: Bytes) -> Result<Bytes, DecodeError> {
        Ok(body)
    }

    fn accept() -> &'static str {
        "application/octet-stream"
    }
}

//! Layered error types for the integrator crate.
//!
//! The error hierarchy mirrors where a failure happens:
//! - [`ApiError`] - Top-level error returned by every public operation
//! - [`ConfigError`] - Invalid service configuration, caught at registration
//! - [`RegistryError`] - Lookup misses and rejected duplicate names
//! - [`ClientError`] - Transport failures and non-2xx responses
//! - [`DecodeError`] - Response bodies that cannot be parsed

mod api_error;
mod client_error;
mod config_error;
mod decode_error;
mod registry_error;

pub use api_error::ApiError;
pub use client_error::ClientError;
pub use config_error::ConfigError;
pub use decode_error::DecodeError;
pub use registry_error::RegistryError;

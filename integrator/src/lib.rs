//! Registry of named REST API clients.
//!
//! The `integrator` crate keeps one configured HTTP client per external
//! service and hands it out by name. Each client resolves request paths under
//! its service endpoint, attaches that service's credentials, and decodes
//! responses into typed values.
//!
//! ## Features
//!
//! - **Named services**: register once at startup, look up anywhere by name
//! - **Per-service credentials**: Basic, bearer, header API key, or query key
//! - **Uniform verbs**: `get`/`post`/`put`/`patch`/`delete` on every client
//! - **Typed bodies**: generic per call, or pinned per service via [`TypedClient`]
//! - **Layered errors**: configuration, lookup, transport, status, and decode
//!   failures are distinct variants of [`ApiError`]
//! - **Config loading**: builders, `{PREFIX}_*` environment variables, or a
//!   YAML/JSON [`RegistryConfig`] document
//!
//! ## Example
//!
//! ```rust,ignore
//! use integrator::{ServiceConfig, ServiceRegistry};
//!
//! #[derive(serde::Deserialize)]
//! struct Invoice { id: u64, total_cents: i64 }
//!
//! let mut registry = ServiceRegistry::new();
//! registry.register(
//!     "billing",
//!     ServiceConfig::new("billing", "https://billing.example.com/v2")?
//!         .with_basic_auth("reporting", "hunter2"),
//! )?;
//!
//! let invoice: Invoice = registry.get_service("billing")?.get("/invoices/42").await?;
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod method;
pub mod registry;
pub mod response;

// Re-exports for convenience
pub use auth::ApiAuth;
pub use client::{ApiClient, TypedClient};
pub use config::{DEFAULT_TIMEOUT, RegistryConfig, ServiceConfig};
pub use error::{ApiError, ClientError, ConfigError, DecodeError, RegistryError};
pub use method::RestMethod;
pub use registry::{ServiceRegistry, SharedServiceRegistry};
pub use response::ResponseFormat;

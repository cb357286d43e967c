//! HTTP client module.
//!
//! An [`ApiClient`] issues requests against one registered service: paths are
//! resolved under the service endpoint, credentials and default headers are
//! attached, and successful bodies are decoded. [`TypedClient`] pins the
//! request and response types for a service.
//!
//! ## Examples
//!
//! ```rust,ignore
//! use integrator::{ApiClient, ServiceConfig};
//!
//! #[derive(serde::Deserialize)]
//! struct Invoice { id: u64, total_cents: i64 }
//!
//! let config = ServiceConfig::new("billing", "https://billing.example.com/v2")?
//!     .with_basic_auth("reporting", "hunter2");
//! let client = ApiClient::new(config)?;
//!
//! // GET https://billing.example.com/v2/invoices/42
//! let invoice: Invoice = client.get("/invoices/42").await?;
//! ```

mod executor;
mod typed;

pub use executor::ApiClient;
pub use typed::TypedClient;

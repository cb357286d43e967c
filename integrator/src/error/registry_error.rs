//! Service registry errors.

use thiserror::Error;

/// Errors from looking up or registering services by name.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// No service was registered under this name.
    #[error("Service not registered: {name}")]
    NotFound {
        /// The requested service name.
        name: String,
    },

    /// A strict registration found the name already taken.
    #[error("Service already registered: {name}")]
    Duplicate {
        /// The conflicting service name.
        name: String,
    },
}

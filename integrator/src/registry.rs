//! Named service registry.
//!
//! [`ServiceRegistry`] maps service names to [`ApiClient`]s. It is meant to be
//! filled during startup and then passed by reference to whatever needs to
//! talk to a service; registration takes `&mut self`, so no lookup can be
//! outstanding while the map changes. [`SharedServiceRegistry`] covers the
//! case where services are added after startup.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::{debug, info, warn};

use crate::client::{ApiClient, TypedClient};
use crate::config::{RegistryConfig, ServiceConfig, validate_name};
use crate::error::{ApiError, RegistryError};

/// Directory of configured API clients keyed by service name.
///
/// ## Examples
///
/// ```rust,ignore
/// use integrator::{ServiceConfig, ServiceRegistry};
///
/// let mut registry = ServiceRegistry::new();
/// registry.register(
///     "billing",
///     ServiceConfig::new("billing", "https://billing.example.com/v2")?
///         .with_basic_auth("reporting", "hunter2"),
/// )?;
///
/// let billing = registry.get_service("billing")?;
/// let invoices: Vec<Invoice> = billing.get("/invoices").await?;
/// ```
#[derive(Debug, Default)]
pub struct ServiceRegistry {
    services: HashMap<String, Arc<ApiClient>>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry from a configuration document.
    ///
    /// Each service is registered under its own `name`. A name listed twice
    /// is rejected with [`RegistryError::Duplicate`].
    pub fn from_config(config: RegistryConfig) -> Result<Self, ApiError> {
        let mut registry = Self::new();
        for service in config.services {
            let name = service.name().to_string();
            registry.try_register(name, service)?;
        }
        Ok(registry)
    }

    /// Registers `config` under `name`, replacing any previous registration.
    ///
    /// ## Errors
    ///
    /// Returns [`ApiError::Config`] if `name` is blank or `config` is invalid.
    /// The registry is unchanged on error.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        config: ServiceConfig,
    ) -> Result<(), ApiError> {
        let name = name.into();
        let client = build_client(&name, config)?;

        if self.services.insert(name.clone(), client).is_some() {
            warn!(service = %name, "replacing existing service registration");
        }
        Ok(())
    }

    /// Registers `config` under `name` unless the name is taken.
    ///
    /// ## Errors
    ///
    /// Returns [`RegistryError::Duplicate`] if `name` is already registered,
    /// or [`ApiError::Config`] if the config is invalid.
    pub fn try_register(
        &mut self,
        name: impl Into<String>,
        config: ServiceConfig,
    ) -> Result<(), ApiError> {
        let name = name.into();
        if self.services.contains_key(&name) {
            return Err(RegistryError::Duplicate { name }.into());
        }
        let client = build_client(&name, config)?;
        self.services.insert(name, client);
        Ok(())
    }

    /// Registers `config` under its own name.
    pub fn register_config(&mut self, config: ServiceConfig) -> Result<(), ApiError> {
        let name = config.name().to_string();
        self.register(name, config)
    }

    /// Returns the client registered under `name`.
    ///
    /// ## Errors
    ///
    /// Returns [`RegistryError::NotFound`] if nothing is registered under `name`.
    pub fn get_service(&self, name: &str) -> Result<&ApiClient, ApiError> {
        self.lookup(name).map(Arc::as_ref)
    }

    /// Returns the client for `name` with fixed request/response types.
    pub fn typed<Req, Res>(&self, name: &str) -> Result<TypedClient<'_, Req, Res>, ApiError> {
        Ok(self.get_service(name)?.typed())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.services.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.services.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    /// Moves the registry behind a lock so it can be shared and extended.
    pub fn into_shared(self) -> SharedServiceRegistry {
        SharedServiceRegistry {
            inner: Arc::new(RwLock::new(self)),
        }
    }

    fn lookup(&self, name: &str) -> Result<&Arc<ApiClient>, ApiError> {
        self.services.get(name).ok_or_else(|| {
            debug!(service = %name, "lookup for unregistered service");
            RegistryError::NotFound {
                name: name.to_string(),
            }
            .into()
        })
    }
}

/// Cloneable, lock-guarded [`ServiceRegistry`] for registration after startup.
///
/// Lookups hand out `Arc<ApiClient>` so no lock is held while a request runs.
/// A client obtained before its name is re-registered keeps the old config.
#[derive(Debug, Clone, Default)]
pub struct SharedServiceRegistry {
    inner: Arc<RwLock<ServiceRegistry>>,
}

impl SharedServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// See [`ServiceRegistry::register`].
    pub fn register(&self, name: impl Into<String>, config: ServiceConfig) -> Result<(), ApiError> {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .register(name, config)
    }

    /// See [`ServiceRegistry::try_register`].
    pub fn try_register(
        &self,
        name: impl Into<String>,
        config: ServiceConfig,
    ) -> Result<(), ApiError> {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .try_register(name, config)
    }

    /// See [`ServiceRegistry::get_service`].
    pub fn get_service(&self, name: &str) -> Result<Arc<ApiClient>, ApiError> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .lookup(name)
            .cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .names()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<ServiceRegistry> for SharedServiceRegistry {
    fn from(registry: ServiceRegistry) -> Self {
        registry.into_shared()
    }
}

fn build_client(name: &str, config: ServiceConfig) -> Result<Arc<ApiClient>, ApiError> {
    validate_name(name)?;
    let client = ApiClient::new(config)?;
    info!(
        service = %name,
        endpoint = %client.endpoint(),
        auth = client.config().auth().map_or("none", |auth| auth.scheme()),
        "registered service"
    );
    Ok(Arc::new(client))
}

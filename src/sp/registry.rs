//! Issuer-keyed service provider registry.
//!
//! The registry is populated once at startup by the config loader (and
//! possibly through the management API path, which is out of scope here)
//! and read concurrently by the SSO protocol handlers afterwards.

use anyhow::{anyhow, Result};
use std::collections::HashMap;
use std::sync::RwLock;

use super::types::ServiceProvider;

/// Keyed store of trusted service providers.
///
/// Modelled as a trait so the loader can be exercised against a fake.
pub trait SpRegistry: Send + Sync {
    /// Register a service provider under its issuer, replacing any previous
    /// registration for the same issuer.
    fn add_service_provider(&self, issuer: &str, sp: ServiceProvider) -> Result<()>;

    /// Look up a service provider by issuer.
    fn get_service_provider(&self, issuer: &str) -> Result<Option<ServiceProvider>>;
}

/// In-memory registry: issuer -> ServiceProvider.
pub struct InMemorySpRegistry {
    providers: RwLock<HashMap<String, ServiceProvider>>,
}

impl InMemorySpRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            providers: RwLock::new(HashMap::new()),
        }
    }

    /// Number of registered service providers.
    pub fn count(&self) -> Result<usize> {
        self.providers
            .read()
            .map(|p| p.len())
            .map_err(|_| anyhow!("Registry lock poisoned"))
    }

    /// Whether an issuer is registered.
    pub fn contains(&self, issuer: &str) -> Result<bool> {
        self.providers
            .read()
            .map(|p| p.contains_key(issuer))
            .map_err(|_| anyhow!("Registry lock poisoned"))
    }

    /// All registered service providers, sorted by issuer for stable output.
    pub fn list(&self) -> Result<Vec<ServiceProvider>> {
        let providers = self
            .providers
            .read()
            .map_err(|_| anyhow!("Registry lock poisoned"))?;
        let mut all: Vec<ServiceProvider> = providers.values().cloned().collect();
        all.sort_by(|a, b| a.issuer.cmp(&b.issuer));
        Ok(all)
    }
}

impl Default for InMemorySpRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SpRegistry for InMemorySpRegistry {
    fn add_service_provider(&self, issuer: &str, sp: ServiceProvider) -> Result<()> {
        let mut providers = self
            .providers
            .write()
            .map_err(|_| anyhow!("Registry lock poisoned"))?;
        providers.insert(issuer.to_string(), sp);
        Ok(())
    }

    fn get_service_provider(&self, issuer: &str) -> Result<Option<ServiceProvider>> {
        self.providers
            .read()
            .map(|p| p.get(issuer).cloned())
            .map_err(|_| anyhow!("Registry lock poisoned"))
    }
}

//! Plugin-based provider registry
//!
//! Provider crates register a [`PluginFactory`] under their type name; the
//! daemon then builds the plugin named by its configuration, with no
//! hard-coded provider switch.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use droplet_core::registry::ProviderRegistry;
//!
//! let registry = ProviderRegistry::new();
//! droplet_provider_digitalocean::register(&registry);
//!
//! let plugin = registry.create_plugin(&config)?;
//! ```

use crate::config::PluginConfig;
use crate::error::{Error, Result};
use crate::traits::{InstancePlugin, PluginFactory};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Registry of plugin factories, keyed by provider type name
///
/// ## Thread Safety
///
/// Uses interior mutability with RwLock, allowing concurrent reads and
/// exclusive writes.
#[derive(Default)]
pub struct ProviderRegistry {
    factories: RwLock<HashMap<String, Box<dyn PluginFactory>>>,
}

impl ProviderRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a plugin factory
    ///
    /// # Parameters
    ///
    /// - `name`: Provider type name (e.g., "digitalocean")
    /// - `factory`: Factory object for creating plugin instances
    pub fn register_provider(&self, name: impl Into<String>, factory: Box<dyn PluginFactory>) {
        let mut factories = self.factories.write().unwrap_or_else(PoisonError::into_inner);
        factories.insert(name.into(), factory);
    }

    /// Create a plugin from configuration
    ///
    /// # Returns
    ///
    /// - `Ok(Arc<dyn InstancePlugin>)`: Created plugin
    /// - `Err(Error)`: Invalid config, unknown provider type, or factory failure
    pub fn create_plugin(&self, config: &PluginConfig) -> Result<Arc<dyn InstancePlugin>> {
        config.validate()?;

        let provider_type = config.provider.type_name();
        let factories = self.factories.read().unwrap_or_else(PoisonError::into_inner);

        let factory = factories
            .get(provider_type)
            .ok_or_else(|| Error::config(format!("Unknown provider type: {}", provider_type)))?;

        factory.create(config)
    }

    /// List all registered provider types
    pub fn list_providers(&self) -> Vec<String> {
        let factories = self.factories.read().unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<String> = factories.keys().cloned().collect();
        names.sort();
        names
    }

    /// Check if a provider type is registered
    pub fn has_provider(&self, name: &str) -> bool {
        let factories = self.factories.read().unwrap_or_else(PoisonError::into_inner);
        factories.contains_key(name)
    }
}

// # Instance Plugin Trait
//
// The contract the orchestrator drives. One implementation per provider,
// picked at process start through the [`ProviderRegistry`](crate::ProviderRegistry).
//
// ## Usage
//
// ```rust,ignore
// use droplet_core::{InstancePlugin, InstanceSpec};
//
// let id = plugin.provision(&InstanceSpec::with_properties(raw)).await?;
// plugin.label(&id, &labels).await?;
// plugin.destroy(&id).await?;
// ```

use crate::error::Result;
use crate::instance::{Description, InstanceId, InstanceSpec};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Orchestrator-facing plugin operations
///
/// # Thread Safety
///
/// Implementations are shared across concurrent orchestrator requests and
/// hold no mutable per-call state.
#[async_trait]
pub trait InstancePlugin: Send + Sync {
    /// Check a raw properties document without contacting the provider
    async fn validate(&self, properties: &str) -> Result<()>;

    /// Create one instance and return its identifier
    async fn provision(&self, spec: &InstanceSpec) -> Result<InstanceId>;

    /// Attach each key/value pair to the instance as a tag
    ///
    /// Stops at the first failure; tags already applied stay applied.
    async fn label(&self, id: &InstanceId, labels: &BTreeMap<String, String>) -> Result<()>;

    /// Destroy an instance
    async fn destroy(&self, id: &InstanceId) -> Result<()>;

    /// List instances owned by this plugin that carry all the given tags
    async fn describe(&self, tags: &BTreeMap<String, String>) -> Result<Vec<Description>>;

    /// Provider name (for logging/debugging)
    fn plugin_name(&self) -> &'static str;
}

/// Helper trait for constructing plugins from configuration
pub trait PluginFactory: Send + Sync {
    /// Create an InstancePlugin from configuration
    fn create(&self, config: &crate::config::PluginConfig) -> Result<Arc<dyn InstancePlugin>>;
}

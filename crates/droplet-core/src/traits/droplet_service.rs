// # Droplet Service Trait
//
// Defines the droplet-management half of the provider API that the plugin
// consumes.
//
// ## Implementations
//
// - DigitalOcean REST v2: `droplet-provider-digitalocean` crate
// - Test doubles: `tests/common/mod.rs`
//
// ## Usage
//
// ```rust,ignore
// use droplet_core::traits::{DropletCreateRequest, DropletService};
//
// async fn launch(droplets: &dyn DropletService) -> droplet_core::Result<u64> {
//     let droplet = droplets.create(&request).await?;
//     Ok(droplet.id)
// }
// ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Everything the provider needs to create one droplet
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropletCreateRequest {
    /// Droplet name (prefix plus a unique suffix)
    pub name: String,
    /// Region slug, fixed per plugin
    pub region: String,
    /// Size slug
    pub size: String,
    /// Image slug
    pub image: String,
    /// Full tag set, version tag included
    pub tags: Vec<String>,
    pub backups: bool,
    pub ipv6: bool,
    pub private_networking: bool,
    /// SSH key IDs or fingerprints
    pub ssh_keys: Vec<String>,
    pub monitoring: bool,
    /// Cloud-init user data
    pub user_data: Option<String>,
}

/// A droplet as reported by the provider
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Droplet {
    /// Provider-assigned numeric ID
    pub id: u64,
    #[serde(default)]
    pub name: String,
    /// Provider status string ("new", "active", "off", ...)
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Droplet management operations
///
/// # Contract
///
/// - One API round trip per call.
/// - No retries, no backoff: failures are returned as-is and the plugin
///   passes them straight to the orchestrator.
/// - No caching between calls.
#[async_trait]
pub trait DropletService: Send + Sync {
    /// Create a droplet
    ///
    /// # Returns
    ///
    /// - `Ok(Droplet)`: the created droplet, `id` populated
    /// - `Err(Error)`: provider failure (auth, quota, invalid slug, network)
    async fn create(&self, request: &DropletCreateRequest) -> Result<Droplet, crate::Error>;

    /// Delete a droplet by numeric ID
    async fn delete(&self, id: u64) -> Result<(), crate::Error>;

    /// List droplets carrying the given tag
    async fn list_by_tag(&self, tag: &str) -> Result<Vec<Droplet>, crate::Error>;
}

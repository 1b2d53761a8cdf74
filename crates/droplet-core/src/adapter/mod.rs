//! Droplet lifecycle adapter
//!
//! [`DropletPlugin`] implements [`InstancePlugin`] on top of a
//! [`DropletService`] and a [`TagService`]:
//!
//! ```text
//! orchestrator ──► DropletPlugin ──► InstanceProperties (decode/validate)
//!                        │
//!                        ├──► DropletService (create / delete / list)
//!                        └──► TagService (tag_resource)
//! ```
//!
//! ## Operation Flow
//!
//! - `provision`: validate, build a create request, one `create` call,
//!   numeric ID rendered as the instance ID
//! - `destroy`: parse the ID, one `delete` call
//! - `label`: one `tag_resource` call per pair, first failure wins
//!
//! Provider errors are returned exactly as the service produced them.

use crate::error::Result;
use crate::instance::{Description, InstanceId, InstanceSpec, join_tag, version_tag};
use crate::properties::InstanceProperties;
use crate::traits::{DropletCreateRequest, DropletService, InstancePlugin, TagService};
use async_trait::async_trait;
use rand::Rng;
use rand::distributions::Alphanumeric;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Length of the random suffix appended to droplet names
pub const NAME_SUFFIX_LEN: usize = 8;

/// Instance plugin backed by droplet and tag services
///
/// Region and service handles are fixed at construction; the plugin is
/// shared by reference across concurrent calls.
#[derive(Clone)]
pub struct DropletPlugin {
    /// Provider name reported by `plugin_name`
    name: &'static str,

    /// Region every droplet is created in
    region: String,

    /// Droplet management
    droplets: Arc<dyn DropletService>,

    /// Tag management
    tags: Arc<dyn TagService>,
}

impl DropletPlugin {
    /// Create a new plugin
    ///
    /// # Parameters
    ///
    /// - `name`: provider name reported by `plugin_name` (e.g. "digitalocean")
    /// - `region`: provider region slug applied to every provision
    /// - `droplets`: droplet service handle
    /// - `tags`: tag service handle
    pub fn new(
        name: &'static str,
        region: impl Into<String>,
        droplets: Arc<dyn DropletService>,
        tags: Arc<dyn TagService>,
    ) -> Self {
        Self {
            name,
            region: region.into(),
            droplets,
            tags,
        }
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    /// Translate a validated spec into a create request
    fn create_request(&self, properties: InstanceProperties, spec: &InstanceSpec) -> DropletCreateRequest {
        let mut tags = properties.tags;
        tags.extend(spec.tags.iter().map(|(k, v)| join_tag(k, v)));
        tags.push(version_tag());

        DropletCreateRequest {
            name: droplet_name(&properties.name_prefix),
            region: self.region.clone(),
            size: properties.size,
            image: properties.image,
            tags,
            backups: properties.backups,
            ipv6: properties.ipv6,
            private_networking: properties.private_networking,
            ssh_keys: properties.ssh_keys,
            monitoring: properties.monitoring,
            user_data: spec.init.clone(),
        }
    }
}

impl std::fmt::Debug for DropletPlugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DropletPlugin")
            .field("name", &self.name)
            .field("region", &self.region)
            .finish_non_exhaustive()
    }
}

/// Droplet name: `<prefix>-<random suffix>`, or just the suffix
pub fn droplet_name(prefix: &str) -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(NAME_SUFFIX_LEN)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect();

    if prefix.is_empty() {
        suffix
    } else {
        format!("{prefix}-{suffix}")
    }
}

#[async_trait]
impl InstancePlugin for DropletPlugin {
    async fn validate(&self, properties: &str) -> Result<()> {
        InstanceProperties::decode(properties).map(|_| ())
    }

    async fn provision(&self, spec: &InstanceSpec) -> Result<InstanceId> {
        let properties = InstanceProperties::from_spec(spec)?;
        let request = self.create_request(properties, spec);

        debug!(
            name = %request.name,
            region = %request.region,
            size = %request.size,
            image = %request.image,
            tags = ?request.tags,
            "Creating droplet"
        );

        let droplet = self.droplets.create(&request).await.inspect_err(|e| {
            warn!(name = %request.name, error = %e, "Droplet creation failed");
        })?;

        let id = InstanceId::from_droplet_id(droplet.id);
        info!(id = %id, name = %request.name, "Droplet created");
        Ok(id)
    }

    async fn label(&self, id: &InstanceId, labels: &BTreeMap<String, String>) -> Result<()> {
        for (key, value) in labels {
            let tag = join_tag(key, value);
            debug!(id = %id, tag = %tag, "Tagging droplet");

            self.tags
                .tag_resource(&tag, id.as_str())
                .await
                .inspect_err(|e| warn!(id = %id, tag = %tag, error = %e, "Tagging failed"))?;
        }
        Ok(())
    }

    async fn destroy(&self, id: &InstanceId) -> Result<()> {
        let droplet_id = id.droplet_id()?;

        self.droplets.delete(droplet_id).await.inspect_err(|e| {
            warn!(id = droplet_id, error = %e, "Droplet deletion failed");
        })?;

        info!(id = droplet_id, "Droplet destroyed");
        Ok(())
    }

    async fn describe(&self, tags: &BTreeMap<String, String>) -> Result<Vec<Description>> {
        let droplets = self.droplets.list_by_tag(&version_tag()).await?;

        let found: Vec<Description> = droplets
            .iter()
            .map(|d| Description::from_tags(d.id, &d.tags))
            .filter(|d| d.matches(tags))
            .collect();

        debug!(listed = droplets.len(), matched = found.len(), "Described droplets");
        Ok(found)
    }

    fn plugin_name(&self) -> &'static str {
        self.name
    }
}

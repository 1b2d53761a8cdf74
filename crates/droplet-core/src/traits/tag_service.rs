// # Tag Service Trait
//
// Tag-management half of the provider API. Used by `label` to attach
// `key:value` tags to an existing droplet.

use async_trait::async_trait;

/// Tag management operations
///
/// Whether `resource_id` names a real droplet is for the provider to decide;
/// callers do not check it beforehand.
#[async_trait]
pub trait TagService: Send + Sync {
    /// Attach `tag` to the droplet identified by `resource_id`
    ///
    /// Implementations create the tag first if the provider requires it.
    async fn tag_resource(&self, tag: &str, resource_id: &str) -> Result<(), crate::Error>;
}

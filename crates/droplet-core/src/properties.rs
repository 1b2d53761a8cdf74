//! Instance properties: decoding and validation
//!
//! The orchestrator hands the plugin an opaque JSON document. It is decoded
//! here, once, into [`InstanceProperties`] and checked before anything is
//! sent to the provider. Keys are PascalCase:
//!
//! ```json
//! {
//!   "NamePrefix": "worker",
//!   "Size": "512mb",
//!   "Image": "ubuntu-14-04-x64",
//!   "Tags": ["swarm"]
//! }
//! ```

use crate::error::{Error, Result};
use crate::instance::InstanceSpec;
use serde::{Deserialize, Serialize};

/// Droplet shape requested by the orchestrator
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct InstanceProperties {
    /// Provider size slug (e.g. "512mb", "s-1vcpu-1gb")
    #[serde(default)]
    pub size: String,

    /// Provider image slug (e.g. "ubuntu-14-04-x64")
    #[serde(default)]
    pub image: String,

    /// Prepended to the generated droplet name
    #[serde(default)]
    pub name_prefix: String,

    /// Free-form tags applied at creation
    #[serde(default)]
    pub tags: Vec<String>,

    /// Enable provider-side backups
    #[serde(default)]
    pub backups: bool,

    /// Enable an IPv6 address
    #[serde(default, rename = "IPv6")]
    pub ipv6: bool,

    /// Enable private networking
    #[serde(default)]
    pub private_networking: bool,

    /// SSH key IDs or fingerprints to install
    #[serde(default, rename = "SSHKeys")]
    pub ssh_keys: Vec<String>,

    /// Install the provider's monitoring agent
    #[serde(default)]
    pub monitoring: bool,
}

impl InstanceProperties {
    /// Decode and validate a raw properties document
    ///
    /// Fails on malformed JSON, wrong field types, unknown keys, or a
    /// missing `Size`/`Image`. Never touches the network.
    pub fn decode(raw: &str) -> Result<Self> {
        let properties: Self =
            serde_json::from_str(raw).map_err(|e| Error::validation(e.to_string()))?;
        properties.validate()?;
        Ok(properties)
    }

    /// Decode the properties carried by an orchestrator spec
    pub fn from_spec(spec: &InstanceSpec) -> Result<Self> {
        match spec.properties.as_deref() {
            Some(raw) => Self::decode(raw),
            None => Err(Error::validation("no properties supplied")),
        }
    }

    /// Check required fields
    pub fn validate(&self) -> Result<()> {
        if self.size.trim().is_empty() {
            return Err(Error::validation("Size is required"));
        }
        if self.image.trim().is_empty() {
            return Err(Error::validation("Image is required"));
        }
        Ok(())
    }
}

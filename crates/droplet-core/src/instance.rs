//! Orchestrator-facing instance types
//!
//! - [`InstanceId`]: the orchestrator's name for a live droplet
//! - [`InstanceSpec`]: what the orchestrator hands to `provision`
//! - [`Description`]: what `describe` reports back
//! - the version tag stamped on every droplet this plugin creates

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Tag name prefix marking droplets created by this plugin
pub const VERSION_TAG_KEY: &str = "droplet-plugin-version";

/// Version written into the version tag
pub const CURRENT_VERSION: &str = "1";

/// Separator between a tag's key and value
pub const TAG_SEPARATOR: char = ':';

/// The version tag, `<VERSION_TAG_KEY>:<CURRENT_VERSION>`
pub fn version_tag() -> String {
    join_tag(VERSION_TAG_KEY, CURRENT_VERSION)
}

/// Render a key/value pair as a single provider tag
pub fn join_tag(key: &str, value: &str) -> String {
    format!("{key}{TAG_SEPARATOR}{value}")
}

/// Split a provider tag back into key and value
///
/// Tags without a separator map to an empty value.
pub fn split_tag(tag: &str) -> (&str, &str) {
    tag.split_once(TAG_SEPARATOR).unwrap_or((tag, ""))
}

/// Identifier of a live instance
///
/// Always the decimal rendering of the provider's numeric droplet ID.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstanceId(String);

impl InstanceId {
    /// Wrap an identifier as received from the orchestrator
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Identifier for a droplet the provider just reported
    pub fn from_droplet_id(id: u64) -> Self {
        Self(id.to_string())
    }

    /// Parse back to the provider's numeric droplet ID
    pub fn droplet_id(&self) -> Result<u64> {
        self.0
            .parse::<u64>()
            .map_err(|e| Error::invalid_id(self.0.clone(), e))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for InstanceId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for InstanceId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Provisioning request from the orchestrator
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceSpec {
    /// Opaque encoded properties document, decoded by the plugin itself
    #[serde(default)]
    pub properties: Option<String>,

    /// Orchestrator-level tags, stored on the droplet as `key:value`
    #[serde(default)]
    pub tags: BTreeMap<String, String>,

    /// Boot script passed to the droplet as user data
    #[serde(default)]
    pub init: Option<String>,
}

impl InstanceSpec {
    /// Spec carrying only a properties document
    pub fn with_properties(properties: impl Into<String>) -> Self {
        Self {
            properties: Some(properties.into()),
            ..Self::default()
        }
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    pub fn with_init(mut self, init: impl Into<String>) -> Self {
        self.init = Some(init.into());
        self
    }
}

/// A live instance as reported by `describe`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Description {
    pub id: InstanceId,
    pub tags: BTreeMap<String, String>,
}

impl Description {
    /// Build from a droplet ID and its raw provider tags
    pub fn from_tags<'a>(id: u64, tags: impl IntoIterator<Item = &'a String>) -> Self {
        let tags = tags
            .into_iter()
            .map(|tag| {
                let (key, value) = split_tag(tag);
                (key.to_string(), value.to_string())
            })
            .collect();

        Self {
            id: InstanceId::from_droplet_id(id),
            tags,
        }
    }

    /// Whether every requested key/value pair is present
    pub fn matches(&self, wanted: &BTreeMap<String, String>) -> bool {
        wanted
            .iter()
            .all(|(key, value)| self.tags.get(key) == Some(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_tag_format() {
        assert_eq!(version_tag(), "droplet-plugin-version:1");
    }

    #[test]
    fn test_tags_use_provider_safe_characters() {
        let allowed = |tag: &str| {
            !tag.is_empty()
                && tag
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | ':'))
        };

        assert!(allowed(&version_tag()), "{}", version_tag());
        assert!(allowed(&join_tag("group", "workers")));
        assert!(allowed(&join_tag("role", "worker_01")));
    }

    #[test]
    fn test_instance_id_round_trip() {
        let id = InstanceId::from_droplet_id(12345);
        assert_eq!(id.as_str(), "12345");
        assert_eq!(id.droplet_id().unwrap(), 12345);
    }

    #[test]
    fn test_instance_id_rejects_non_numeric() {
        let err = InstanceId::new("foo").droplet_id().unwrap_err();
        assert!(matches!(err, Error::InvalidId { ref id, .. } if id == "foo"));
    }

    #[test]
    fn test_instance_id_rejects_negative() {
        assert!(InstanceId::new("-1").droplet_id().is_err());
    }

    #[test]
    fn test_split_tag() {
        assert_eq!(split_tag("env:prod"), ("env", "prod"));
        assert_eq!(split_tag("url:http://x"), ("url", "http://x"));
        assert_eq!(split_tag("bare"), ("bare", ""));
    }

    #[test]
    fn test_description_matches() {
        let raw = vec![version_tag(), "role:worker".to_string(), "foo".to_string()];
        let desc = Description::from_tags(7, &raw);

        assert_eq!(desc.id, InstanceId::new("7"));
        assert_eq!(desc.tags.get("foo").map(String::as_str), Some(""));

        let mut wanted = BTreeMap::new();
        wanted.insert("role".to_string(), "worker".to_string());
        assert!(desc.matches(&wanted));

        wanted.insert("role".to_string(), "manager".to_string());
        assert!(!desc.matches(&wanted));
    }

    #[test]
    fn test_spec_builder() {
        let spec = InstanceSpec::with_properties("{}")
            .with_tag("group", "workers")
            .with_init("#!/bin/sh");
        assert_eq!(spec.properties.as_deref(), Some("{}"));
        assert_eq!(spec.tags.get("group").map(String::as_str), Some("workers"));
        assert_eq!(spec.init.as_deref(), Some("#!/bin/sh"));
    }
}

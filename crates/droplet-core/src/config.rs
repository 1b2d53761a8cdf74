//! Configuration types for the droplet plugin
//!
//! Configuration is captured once when a plugin is built; nothing here is
//! consulted per call.

use serde::{Deserialize, Serialize};

/// Region used when none is configured
pub const DEFAULT_REGION: &str = "nyc3";

/// Main plugin configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginConfig {
    /// Provider configuration
    pub provider: ProviderConfig,

    /// Region every droplet is created in
    #[serde(default = "default_region")]
    pub region: String,
}

impl PluginConfig {
    /// Create a configuration for the given provider in the default region
    pub fn new(provider: ProviderConfig) -> Self {
        Self {
            provider,
            region: default_region(),
        }
    }

    /// Set the region
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.region.trim().is_empty() {
            return Err(crate::Error::config("Region cannot be empty"));
        }

        self.provider.validate()
    }
}

/// Provider configuration
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProviderConfig {
    /// DigitalOcean REST API
    #[serde(rename = "digitalocean")]
    DigitalOcean {
        /// Personal access token with read/write scope
        access_token: String,
        /// API base URL override (defaults to the public endpoint)
        #[serde(default)]
        api_base: Option<String>,
    },

    /// Custom provider
    Custom {
        /// Factory name to use
        factory: String,
        /// Custom configuration data
        config: serde_json::Value,
    },
}

impl ProviderConfig {
    /// Validate the provider configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            ProviderConfig::DigitalOcean { access_token, api_base } => {
                if access_token.is_empty() {
                    return Err(crate::Error::config(
                        "DigitalOcean access token cannot be empty",
                    ));
                }
                if let Some(base) = api_base
                    && !base.starts_with("https://")
                    && !base.starts_with("http://")
                {
                    return Err(crate::Error::config(format!(
                        "DigitalOcean API base must be an HTTP(S) URL, got: {base}"
                    )));
                }
                Ok(())
            }
            ProviderConfig::Custom { factory, config } => {
                if factory.is_empty() {
                    return Err(crate::Error::config(
                        "Custom provider factory cannot be empty",
                    ));
                }
                if config.is_null() {
                    return Err(crate::Error::config(
                        "Custom provider config cannot be null",
                    ));
                }
                Ok(())
            }
        }
    }

    /// Get the provider type name
    pub fn type_name(&self) -> &str {
        match self {
            ProviderConfig::DigitalOcean { .. } => "digitalocean",
            ProviderConfig::Custom { factory, .. } => factory,
        }
    }
}

// Keeps the access token out of logs
impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderConfig::DigitalOcean { api_base, .. } => f
                .debug_struct("DigitalOcean")
                .field("access_token", &"<REDACTED>")
                .field("api_base", api_base)
                .finish(),
            ProviderConfig::Custom { factory, config } => f
                .debug_struct("Custom")
                .field("factory", factory)
                .field("config", config)
                .finish(),
        }
    }
}

fn default_region() -> String {
    DEFAULT_REGION.to_string()
}

// # droplet-core
//
// Core library for the droplet instance plugin.
//
// ## Architecture Overview
//
// An external orchestrator creates, labels and destroys droplets through a
// fixed plugin contract. This crate holds that contract and its one
// implementation:
// - **InstancePlugin**: Trait the orchestrator drives (validate / provision / label / destroy / describe)
// - **DropletService** / **TagService**: Traits for the provider API the plugin consumes
// - **InstanceProperties**: Decoding and validation of the opaque properties document
// - **DropletPlugin**: Lifecycle adapter translating each call into provider requests
// - **ProviderRegistry**: Plugin-based registry of provider factories
//
// ## Design Principles
//
// 1. **Fail closed**: Properties are validated before any provider call
// 2. **Pass-through errors**: Provider errors reach the caller unchanged
// 3. **Stateless**: Region and service handles are fixed at construction
// 4. **Library-First**: The daemon is a thin shell over this crate

pub mod adapter;
pub mod config;
pub mod error;
pub mod instance;
pub mod properties;
pub mod registry;
pub mod traits;

// Re-export core types for convenience
pub use adapter::DropletPlugin;
pub use config::{PluginConfig, ProviderConfig};
pub use error::{Error, Result};
pub use instance::{Description, InstanceId, InstanceSpec, version_tag};
pub use properties::InstanceProperties;
pub use registry::ProviderRegistry;
pub use traits::{DropletService, InstancePlugin, PluginFactory, TagService};

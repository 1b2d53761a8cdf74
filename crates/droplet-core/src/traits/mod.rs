//! Core traits for the droplet plugin
//!
//! - [`InstancePlugin`]: what the orchestrator calls
//! - [`DropletService`]: droplet management on the provider side
//! - [`TagService`]: tag management on the provider side

pub mod droplet_service;
pub mod instance_plugin;
pub mod tag_service;

pub use droplet_service::{Droplet, DropletCreateRequest, DropletService};
pub use instance_plugin::{InstancePlugin, PluginFactory};
pub use tag_service::TagService;

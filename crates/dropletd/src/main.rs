// # dropletd - Droplet Plugin Host
//
// Thin command-line host for the droplet instance plugin. All provisioning
// logic lives in droplet-core; this binary only:
// 1. Reads configuration from environment variables
// 2. Initializes logging and the runtime
// 3. Registers providers and builds the plugin
// 4. Runs one plugin operation and prints its result
//
// ## Configuration
//
// - `DROPLET_ACCESS_TOKEN`: Provider API token (required except for `validate`)
// - `DROPLET_REGION`: Region for new droplets (default: nyc3)
// - `DROPLET_PROVIDER_TYPE`: Provider type (default: digitalocean)
// - `DROPLET_API_BASE`: API base URL override (optional)
// - `DROPLET_LOG_LEVEL`: trace, debug, info, warn, error (default: info)
//
// ## Example
//
// ```bash
// export DROPLET_ACCESS_TOKEN=your_token
// export DROPLET_REGION=ams2
//
// dropletd validate worker.json
// ID=$(dropletd provision worker.json --tag group=workers)
// dropletd label "$ID" role=worker
// dropletd describe --tag group=workers
// dropletd destroy "$ID"
// ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use droplet_core::{
    InstanceId, InstancePlugin, InstanceProperties, InstanceSpec, PluginConfig, ProviderConfig,
    ProviderRegistry,
};
use std::collections::BTreeMap;
use std::env;
use std::io::Read;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

/// Exit codes for different termination scenarios
#[derive(Debug, Clone, Copy)]
enum DropletdExitCode {
    /// Operation succeeded
    Success = 0,
    /// Configuration error or invalid input
    ConfigError = 1,
    /// Operation failed (provider or runtime error)
    RuntimeError = 2,
}

impl From<DropletdExitCode> for ExitCode {
    fn from(code: DropletdExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Manage droplets through the instance plugin
#[derive(Parser)]
#[command(name = "dropletd")]
#[command(about = "Provision, label and destroy droplets through the instance plugin")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check an instance properties document ("-" reads stdin)
    Validate { properties: String },

    /// Create a droplet and print its instance ID
    Provision {
        /// Instance properties document ("-" reads stdin)
        properties: String,

        /// Orchestrator tag, repeatable
        #[arg(long = "tag", value_parser = parse_key_value)]
        tags: Vec<(String, String)>,

        /// File passed to the droplet as user data
        #[arg(long)]
        init: Option<String>,
    },

    /// Attach key=value labels to a droplet
    Label {
        id: String,
        #[arg(value_parser = parse_key_value, required = true)]
        labels: Vec<(String, String)>,
    },

    /// Destroy a droplet
    Destroy { id: String },

    /// List droplets created by this plugin, one JSON object per line
    Describe {
        /// Only droplets carrying this tag, repeatable
        #[arg(long = "tag", value_parser = parse_key_value)]
        tags: Vec<(String, String)>,
    },
}

/// Parse a `key=value` argument
fn parse_key_value(s: &str) -> std::result::Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected key=value, got '{}'", s)),
    }
}

/// Read a file, or stdin for "-"
fn read_input(path: &str) -> Result<String> {
    if path == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read stdin")?;
        return Ok(buf);
    }

    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path))
}

/// Application configuration
struct Config {
    access_token: String,
    region: String,
    provider_type: String,
    api_base: Option<String>,
    log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Self {
        Self {
            access_token: env::var("DROPLET_ACCESS_TOKEN").unwrap_or_default(),
            region: env::var("DROPLET_REGION")
                .unwrap_or_else(|_| droplet_core::config::DEFAULT_REGION.to_string()),
            provider_type: env::var("DROPLET_PROVIDER_TYPE")
                .unwrap_or_else(|_| "digitalocean".to_string()),
            api_base: env::var("DROPLET_API_BASE").ok().filter(|s| !s.is_empty()),
            log_level: env::var("DROPLET_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        }
    }

    /// Validate the settings every command needs
    fn validate_logging(&self) -> Result<Level> {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Ok(Level::TRACE),
            "debug" => Ok(Level::DEBUG),
            "info" => Ok(Level::INFO),
            "warn" => Ok(Level::WARN),
            "error" => Ok(Level::ERROR),
            _ => anyhow::bail!(
                "DROPLET_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }
    }

    /// Validate the provider settings
    fn validate_provider(&self) -> Result<()> {
        if self.access_token.is_empty() {
            anyhow::bail!(
                "DROPLET_ACCESS_TOKEN is required. \
                Set it via: export DROPLET_ACCESS_TOKEN=your_token"
            );
        }

        let token_lower = self.access_token.to_lowercase();
        if token_lower.contains("your_token") || token_lower.contains("replace_me") {
            anyhow::bail!(
                "DROPLET_ACCESS_TOKEN appears to be a placeholder. \
                Use an actual API token from your provider."
            );
        }

        if self.region.is_empty()
            || !self
                .region
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        {
            anyhow::bail!(
                "DROPLET_REGION '{}' is not a region slug (e.g. nyc3, ams2)",
                self.region
            );
        }

        Ok(())
    }

    /// Build the plugin configuration for the registry
    fn plugin_config(&self) -> Result<PluginConfig> {
        let provider = match self.provider_type.as_str() {
            "digitalocean" => ProviderConfig::DigitalOcean {
                access_token: self.access_token.clone(),
                api_base: self.api_base.clone(),
            },
            other => anyhow::bail!(
                "DROPLET_PROVIDER_TYPE '{}' is not supported. \
                Supported providers: digitalocean",
                other
            ),
        };

        Ok(PluginConfig::new(provider).with_region(self.region.clone()))
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    let config = Config::from_env();

    let log_level = match config.validate_logging() {
        Ok(level) => level,
        Err(e) => {
            eprintln!("Configuration validation error: {}", e);
            return DropletdExitCode::ConfigError.into();
        }
    };

    // Logs go to stderr; stdout carries command output
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return DropletdExitCode::ConfigError.into();
    }

    // Validation is local and needs no provider
    if let Command::Validate { properties } = &args.command {
        return match read_input(properties)
            .and_then(|raw| InstanceProperties::decode(&raw).map_err(Into::into))
        {
            Ok(_) => {
                info!("Properties are valid");
                DropletdExitCode::Success.into()
            }
            Err(e) => {
                error!("{:#}", e);
                DropletdExitCode::ConfigError.into()
            }
        };
    }

    let plugin = match build_plugin(&config) {
        Ok(plugin) => plugin,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return DropletdExitCode::ConfigError.into();
        }
    };

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return DropletdExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(run_command(plugin.as_ref(), args.command));

    match result {
        Ok(()) => DropletdExitCode::Success.into(),
        Err(e) => {
            error!("{:#}", e);
            DropletdExitCode::RuntimeError.into()
        }
    }
}

/// Register providers and build the configured plugin
fn build_plugin(config: &Config) -> Result<Arc<dyn InstancePlugin>> {
    config.validate_provider()?;

    let registry = ProviderRegistry::new();

    #[cfg(feature = "digitalocean")]
    droplet_provider_digitalocean::register(&registry);

    info!("Registered providers: {:?}", registry.list_providers());

    let plugin_config = config.plugin_config()?;
    let plugin = registry.create_plugin(&plugin_config)?;
    Ok(plugin)
}

/// Run one plugin operation
async fn run_command(plugin: &dyn InstancePlugin, command: Command) -> Result<()> {
    match command {
        Command::Validate { properties } => {
            plugin.validate(&read_input(&properties)?).await?;
        }
        Command::Provision {
            properties,
            tags,
            init,
        } => {
            let spec = InstanceSpec {
                properties: Some(read_input(&properties)?),
                tags: tags.into_iter().collect(),
                init: init.as_deref().map(read_input).transpose()?,
            };

            let id = plugin.provision(&spec).await?;
            println!("{}", id);
        }
        Command::Label { id, labels } => {
            let labels: BTreeMap<String, String> = labels.into_iter().collect();
            plugin.label(&InstanceId::new(id), &labels).await?;
        }
        Command::Destroy { id } => {
            plugin.destroy(&InstanceId::new(id)).await?;
        }
        Command::Describe { tags } => {
            let tags: BTreeMap<String, String> = tags.into_iter().collect();
            for description in plugin.describe(&tags).await? {
                println!("{}", serde_json::to_string(&description)?);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(token: &str, region: &str) -> Config {
        Config {
            access_token: token.to_string(),
            region: region.to_string(),
            provider_type: "digitalocean".to_string(),
            api_base: None,
            log_level: "info".to_string(),
        }
    }

    #[test]
    fn test_parse_key_value() {
        assert_eq!(
            parse_key_value("group=workers"),
            Ok(("group".to_string(), "workers".to_string()))
        );
        assert_eq!(
            parse_key_value("url=http://x?a=b"),
            Ok(("url".to_string(), "http://x?a=b".to_string()))
        );
        assert_eq!(parse_key_value("empty="), Ok(("empty".to_string(), String::new())));
        assert!(parse_key_value("novalue").is_err());
        assert!(parse_key_value("=value").is_err());
    }

    #[test]
    fn test_validate_provider() {
        assert!(config("dop_v1_abcdef", "ams2").validate_provider().is_ok());
        assert!(config("", "ams2").validate_provider().is_err());
        assert!(config("YOUR_TOKEN", "ams2").validate_provider().is_err());
        assert!(config("dop_v1_abcdef", "AMS 2").validate_provider().is_err());
    }

    #[test]
    fn test_log_level() {
        let mut cfg = config("t", "nyc3");
        assert_eq!(cfg.validate_logging().unwrap(), Level::INFO);
        cfg.log_level = "DEBUG".to_string();
        assert_eq!(cfg.validate_logging().unwrap(), Level::DEBUG);
        cfg.log_level = "loud".to_string();
        assert!(cfg.validate_logging().is_err());
    }

    #[test]
    fn test_unsupported_provider_type() {
        let mut cfg = config("dop_v1_abcdef", "nyc3");
        cfg.provider_type = "aws".to_string();
        assert!(cfg.plugin_config().is_err());
    }

    #[test]
    fn test_plugin_config() {
        let cfg = config("dop_v1_abcdef", "asm2");
        let plugin_config = cfg.plugin_config().unwrap();
        assert_eq!(plugin_config.region, "asm2");
        assert_eq!(plugin_config.provider.type_name(), "digitalocean");
    }

    #[cfg(feature = "digitalocean")]
    #[test]
    fn test_build_plugin() {
        let plugin = build_plugin(&config("dop_v1_abcdef", "asm2")).unwrap();
        assert_eq!(plugin.plugin_name(), "digitalocean");
    }

    #[test]
    fn test_cli_parses_commands() {
        let args = Args::try_parse_from([
            "dropletd", "provision", "spec.json", "--tag", "group=workers", "--init", "boot.sh",
        ])
        .unwrap();
        match args.command {
            Command::Provision { properties, tags, init } => {
                assert_eq!(properties, "spec.json");
                assert_eq!(tags, vec![("group".to_string(), "workers".to_string())]);
                assert_eq!(init.as_deref(), Some("boot.sh"));
            }
            _ => panic!("expected provision"),
        }

        assert!(Args::try_parse_from(["dropletd", "label", "123"]).is_err());
    }
}

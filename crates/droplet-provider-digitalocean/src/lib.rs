// # DigitalOcean Provider
//
// DigitalOcean implementation of the droplet plugin's provider services.
//
// ## What It Does
//
// - `DropletService`: create, delete and list droplets
// - `TagService`: attach `key:value` tags to droplets
// - `DigitalOceanFactory` + `register()`: plug into the `ProviderRegistry`
//
// ## Constraints
//
// - No retry, backoff or caching: one failure is one error, returned as-is
// - HTTP timeout of 30 seconds on every request
// - Droplet listing follows at most `MAX_LIST_PAGES` pages and refuses a
//   `next` link it has already visited
// - Access token never appears in logs or `Debug` output
//
// ## API Reference
//
// - DigitalOcean API v2: https://docs.digitalocean.com/reference/api/
// - Create Droplet: POST `/v2/droplets`
// - Delete Droplet: DELETE `/v2/droplets/:id`
// - List Droplets: GET `/v2/droplets?tag_name=...`
// - Create Tag: POST `/v2/tags`
// - Tag Resources: POST `/v2/tags/:name/resources`

use async_trait::async_trait;
use droplet_core::config::{PluginConfig, ProviderConfig};
use droplet_core::traits::{
    Droplet, DropletCreateRequest, DropletService, InstancePlugin, PluginFactory, TagService,
};
use droplet_core::{DropletPlugin, Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

/// DigitalOcean API base URL
pub const DIGITALOCEAN_API_BASE: &str = "https://api.digitalocean.com";

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Page size used when listing droplets
const LIST_PAGE_SIZE: &str = "200";

/// Resource type used when tagging droplets
const DROPLET_RESOURCE_TYPE: &str = "droplet";

/// Upper bound on pages fetched by a single droplet listing
pub const MAX_LIST_PAGES: usize = 100;

/// Provider name reported by plugins this crate builds
pub const PROVIDER_NAME: &str = "digitalocean";

/// Whether DigitalOcean accepts `tag` as a tag name
///
/// Tag names are limited to ASCII letters, digits, `_`, `-` and `:`.
pub fn valid_tag_name(tag: &str) -> bool {
    !tag.is_empty()
        && tag
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | ':'))
}

/// DigitalOcean droplet and tag services over the REST API
///
/// Stateless apart from the HTTP client; safe to share across tasks.
pub struct DigitalOceanProvider {
    /// Personal access token
    /// ⚠️ NEVER log this value
    access_token: String,

    /// API base URL, without trailing slash
    api_base: String,

    /// HTTP client for API requests
    client: reqwest::Client,
}

// Custom Debug implementation that hides the access token
impl std::fmt::Debug for DigitalOceanProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DigitalOceanProvider")
            .field("access_token", &"<REDACTED>")
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl DigitalOceanProvider {
    /// Create a new DigitalOcean provider
    ///
    /// # Parameters
    ///
    /// - `access_token`: token with read/write scope
    /// - `api_base`: API base URL override; `None` for the public endpoint
    pub fn new(access_token: impl Into<String>, api_base: Option<String>) -> Result<Self> {
        let access_token = access_token.into();
        if access_token.is_empty() {
            return Err(Error::config("DigitalOcean access token cannot be empty"));
        }

        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::http(format!("Failed to build HTTP client: {}", e)))?;

        let api_base = api_base
            .unwrap_or_else(|| DIGITALOCEAN_API_BASE.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            access_token,
            api_base,
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/v2{}", self.api_base, path)
    }

    /// `/v2/tags/{tag}/resources`, with the tag as one encoded path segment
    fn tag_resources_url(&self, tag: &str) -> Result<reqwest::Url> {
        let mut url = reqwest::Url::parse(&self.url("/tags"))
            .map_err(|e| Error::config(format!("Invalid API base {}: {}", self.api_base, e)))?;

        url.path_segments_mut()
            .map_err(|_| Error::config(format!("Invalid API base {}", self.api_base)))?
            .push(tag)
            .push("resources");

        Ok(url)
    }

    /// Send a request, mapping transport failures and non-2xx responses
    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        action: &str,
    ) -> Result<reqwest::Response> {
        let response = request
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|e| Error::http(format!("{} failed: {}", action, e)))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unable to read error response".to_string());

        tracing::debug!("{} returned {}", action, status);
        Err(error_from_response(status.as_u16(), &body))
    }

    /// Make sure a tag exists before attaching it
    ///
    /// Creating an existing tag returns it unchanged.
    async fn ensure_tag(&self, tag: &str) -> Result<()> {
        let request = self
            .client
            .post(self.url("/tags"))
            .json(&serde_json::json!({ "name": tag }));

        self.send(request, "create tag").await?;
        Ok(())
    }
}

/// Error body returned by the API on failure
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: String,
}

/// Build an [`Error::Api`] from a failed response
///
/// Uses the API's own `message` when the body has one, otherwise the raw
/// body text, otherwise a generic description of the status.
pub fn error_from_response(status: u16, body: &str) -> Error {
    let message = serde_json::from_str::<ApiErrorBody>(body)
        .ok()
        .map(|b| b.message)
        .filter(|m| !m.is_empty())
        .or_else(|| Some(body.trim().to_string()).filter(|b| !b.is_empty()))
        .unwrap_or_else(|| match status {
            401 | 403 => "Authentication failed".to_string(),
            404 => "Not found".to_string(),
            429 => "Rate limit exceeded".to_string(),
            _ => "Request failed".to_string(),
        });

    Error::api(status, message)
}

/// SSH key reference: numeric ID or fingerprint
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
enum SshKeyRef<'a> {
    Id(u64),
    Fingerprint(&'a str),
}

impl<'a> SshKeyRef<'a> {
    fn parse(key: &'a str) -> Self {
        key.parse().map(SshKeyRef::Id).unwrap_or(SshKeyRef::Fingerprint(key))
    }
}

/// JSON body for POST /v2/droplets
#[derive(Debug, Serialize)]
struct CreateDropletBody<'a> {
    name: &'a str,
    region: &'a str,
    size: &'a str,
    image: &'a str,
    backups: bool,
    ipv6: bool,
    private_networking: bool,
    monitoring: bool,
    ssh_keys: Vec<SshKeyRef<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_data: Option<&'a str>,
    tags: &'a [String],
}

impl<'a> From<&'a DropletCreateRequest> for CreateDropletBody<'a> {
    fn from(req: &'a DropletCreateRequest) -> Self {
        Self {
            name: &req.name,
            region: &req.region,
            size: &req.size,
            image: &req.image,
            backups: req.backups,
            ipv6: req.ipv6,
            private_networking: req.private_networking,
            monitoring: req.monitoring,
            ssh_keys: req.ssh_keys.iter().map(|k| SshKeyRef::parse(k)).collect(),
            user_data: req.user_data.as_deref(),
            tags: &req.tags,
        }
    }
}

#[derive(Debug, Deserialize)]
struct DropletEnvelope {
    droplet: Droplet,
}

#[derive(Debug, Default, Deserialize)]
struct DropletsPage {
    #[serde(default)]
    droplets: Vec<Droplet>,
    #[serde(default)]
    links: Links,
}

#[derive(Debug, Default, Deserialize)]
struct Links {
    #[serde(default)]
    pages: Option<Pages>,
}

#[derive(Debug, Default, Deserialize)]
struct Pages {
    #[serde(default)]
    next: Option<String>,
}

impl DropletsPage {
    fn next_page(&self) -> Option<&str> {
        self.links.pages.as_ref()?.next.as_deref()
    }
}

#[async_trait]
impl DropletService for DigitalOceanProvider {
    async fn create(&self, request: &DropletCreateRequest) -> Result<Droplet> {
        tracing::info!(
            "Creating DigitalOcean droplet: {} ({}, {}, {})",
            request.name,
            request.region,
            request.size,
            request.image
        );

        for tag in request.tags.iter().filter(|t| !valid_tag_name(t)) {
            tracing::warn!("Tag {:?} contains characters DigitalOcean rejects", tag);
        }

        let http = self
            .client
            .post(self.url("/droplets"))
            .json(&CreateDropletBody::from(request));

        let envelope: DropletEnvelope = self
            .send(http, "create droplet")
            .await?
            .json()
            .await
            .map_err(|e| Error::http(format!("Failed to parse response: {}", e)))?;

        Ok(envelope.droplet)
    }

    async fn delete(&self, id: u64) -> Result<()> {
        tracing::info!("Deleting DigitalOcean droplet: {}", id);

        let http = self.client.delete(self.url(&format!("/droplets/{}", id)));
        self.send(http, "delete droplet").await?;
        Ok(())
    }

    async fn list_by_tag(&self, tag: &str) -> Result<Vec<Droplet>> {
        let mut droplets = Vec::new();
        let mut http = self
            .client
            .get(self.url("/droplets"))
            .query(&[("tag_name", tag), ("per_page", LIST_PAGE_SIZE)]);

        let mut visited = HashSet::new();

        for _ in 0..MAX_LIST_PAGES {
            let page: DropletsPage = self
                .send(http, "list droplets")
                .await?
                .json()
                .await
                .map_err(|e| Error::http(format!("Failed to parse response: {}", e)))?;

            let next = page.next_page().map(str::to_string);
            droplets.extend(page.droplets);

            let Some(next) = next else {
                tracing::debug!("Listed {} droplet(s) tagged {}", droplets.len(), tag);
                return Ok(droplets);
            };

            if !visited.insert(next.clone()) {
                return Err(Error::http(format!(
                    "list droplets: pagination returned {} twice",
                    next
                )));
            }
            http = self.client.get(next);
        }

        Err(Error::http(format!(
            "list droplets: more than {} pages",
            MAX_LIST_PAGES
        )))
    }
}

#[async_trait]
impl TagService for DigitalOceanProvider {
    async fn tag_resource(&self, tag: &str, resource_id: &str) -> Result<()> {
        tracing::debug!("Tagging droplet {} with {}", resource_id, tag);

        if !valid_tag_name(tag) {
            tracing::warn!("Tag {:?} contains characters DigitalOcean rejects", tag);
        }

        self.ensure_tag(tag).await?;

        let http = self
            .client
            .post(self.tag_resources_url(tag)?)
            .json(&serde_json::json!({
                "resources": [{
                    "resource_id": resource_id,
                    "resource_type": DROPLET_RESOURCE_TYPE,
                }]
            }));

        self.send(http, "tag resource").await?;
        Ok(())
    }
}

/// Factory for creating DigitalOcean-backed plugins
pub struct DigitalOceanFactory;

impl PluginFactory for DigitalOceanFactory {
    fn create(&self, config: &PluginConfig) -> Result<Arc<dyn InstancePlugin>> {
        match &config.provider {
            ProviderConfig::DigitalOcean {
                access_token,
                api_base,
            } => {
                if access_token.is_empty() {
                    return Err(Error::config("DigitalOcean access token is required"));
                }

                let provider = Arc::new(DigitalOceanProvider::new(
                    access_token.clone(),
                    api_base.clone(),
                )?);

                tracing::info!("DigitalOcean plugin ready in region {}", config.region);

                Ok(Arc::new(DropletPlugin::new(
                    PROVIDER_NAME,
                    config.region.clone(),
                    provider.clone(),
                    provider,
                )))
            }
            _ => Err(Error::config("Invalid config for DigitalOcean provider")),
        }
    }
}

/// Register the DigitalOcean provider with a registry
///
/// # Example
///
/// ```rust
/// use droplet_core::ProviderRegistry;
///
/// let registry = ProviderRegistry::new();
/// droplet_provider_digitalocean::register(&registry);
/// assert!(registry.has_provider("digitalocean"));
/// ```
pub fn register(registry: &droplet_core::ProviderRegistry) {
    registry.register_provider(PROVIDER_NAME, Box::new(DigitalOceanFactory));
}

//! Test doubles and common utilities for plugin contract tests
//!
//! Recording fakes for the provider services. They make no network calls
//! and let tests assert exactly what the plugin asked the provider to do.

#![allow(dead_code)]

use droplet_core::error::{Error, Result};
use droplet_core::traits::{Droplet, DropletCreateRequest, DropletService, TagService};
use droplet_core::DropletPlugin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Properties from the reference provisioning scenario
pub const SCENARIO_PROPERTIES: &str = r#"{
  "NamePrefix": "foo",
  "Size": "512mb",
  "Image": "ubuntu-14-04-x64",
  "Tags": ["foo"]
}"#;

/// Region from the reference provisioning scenario
pub const SCENARIO_REGION: &str = "asm2";

/// A DropletService that records every call
#[derive(Default)]
pub struct FakeDropletService {
    /// Error message returned by every call, if set
    expected_err: Option<String>,
    /// ID assigned to created droplets
    next_id: u64,
    /// Droplets returned by list_by_tag
    listed: Vec<Droplet>,
    create_calls: AtomicUsize,
    delete_calls: AtomicUsize,
    list_calls: AtomicUsize,
    requests: Mutex<Vec<DropletCreateRequest>>,
    deleted: Mutex<Vec<u64>>,
    list_tags: Mutex<Vec<String>>,
}

impl FakeDropletService {
    pub fn new() -> Self {
        Self {
            next_id: 12345,
            ..Self::default()
        }
    }

    /// Every call fails with `message`
    pub fn failing(message: &str) -> Self {
        Self {
            expected_err: Some(message.to_string()),
            ..Self::new()
        }
    }

    pub fn with_id(mut self, id: u64) -> Self {
        self.next_id = id;
        self
    }

    pub fn with_listed(mut self, droplets: Vec<Droplet>) -> Self {
        self.listed = droplets;
        self
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn delete_calls(&self) -> usize {
        self.delete_calls.load(Ordering::SeqCst)
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<DropletCreateRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn deleted(&self) -> Vec<u64> {
        self.deleted.lock().unwrap().clone()
    }

    pub fn list_tags(&self) -> Vec<String> {
        self.list_tags.lock().unwrap().clone()
    }

    fn outcome(&self) -> Result<()> {
        match &self.expected_err {
            Some(message) => Err(Error::provider(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait::async_trait]
impl DropletService for FakeDropletService {
    async fn create(&self, request: &DropletCreateRequest) -> Result<Droplet> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        self.outcome()?;

        Ok(Droplet {
            id: self.next_id,
            name: request.name.clone(),
            status: "new".to_string(),
            tags: request.tags.clone(),
        })
    }

    async fn delete(&self, id: u64) -> Result<()> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        self.deleted.lock().unwrap().push(id);
        self.outcome()
    }

    async fn list_by_tag(&self, tag: &str) -> Result<Vec<Droplet>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.list_tags.lock().unwrap().push(tag.to_string());
        self.outcome()?;
        Ok(self.listed.clone())
    }
}

/// A TagService that records every call
#[derive(Default)]
pub struct FakeTagService {
    /// Error message and the zero-based call index it is returned on
    failure: Option<(usize, String)>,
    calls: AtomicUsize,
    applied: Mutex<Vec<(String, String)>>,
}

impl FakeTagService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail on the `call`-th request (zero-based) with `message`
    pub fn failing_at(call: usize, message: &str) -> Self {
        Self {
            failure: Some((call, message.to_string())),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Successfully applied (tag, resource_id) pairs
    pub fn applied(&self) -> Vec<(String, String)> {
        self.applied.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl TagService for FakeTagService {
    async fn tag_resource(&self, tag: &str, resource_id: &str) -> Result<()> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some((fail_at, message)) = &self.failure
            && *fail_at == call
        {
            return Err(Error::provider(message.clone()));
        }

        self.applied
            .lock()
            .unwrap()
            .push((tag.to_string(), resource_id.to_string()));
        Ok(())
    }
}

/// Provider name the test plugins report
pub const FAKE_PROVIDER: &str = "fake";

/// Build a plugin over the given fakes
pub fn plugin(
    region: &str,
    droplets: &Arc<FakeDropletService>,
    tags: &Arc<FakeTagService>,
) -> DropletPlugin {
    DropletPlugin::new(FAKE_PROVIDER, region, droplets.clone(), tags.clone())
}

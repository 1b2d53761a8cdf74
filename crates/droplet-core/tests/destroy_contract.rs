//! Contract Test: Destroy
//!
//! Constraints verified:
//! - Non-numeric IDs fail before any provider call, naming the input
//! - Numeric IDs are deleted with exactly that value
//! - Provider errors come back unchanged, including for repeated deletes

mod common;

use common::*;
use droplet_core::{Error, InstanceId, InstancePlugin};
use std::sync::Arc;

#[tokio::test]
async fn non_numeric_id_fails_without_provider_call() {
    let droplets = Arc::new(FakeDropletService::failing("something went wrong"));
    let plugin = plugin("nyc3", &droplets, &Arc::new(FakeTagService::new()));

    let err = plugin.destroy(&InstanceId::new("foo")).await.unwrap_err();

    assert!(matches!(err, Error::InvalidId { ref id, .. } if id == "foo"));
    let msg = err.to_string();
    assert!(msg.contains("\"foo\""), "{msg}");
    assert!(msg.contains("invalid digit found in string"), "{msg}");
    assert_eq!(droplets.delete_calls(), 0);
}

#[tokio::test]
async fn numeric_id_is_deleted() {
    let droplets = Arc::new(FakeDropletService::new());
    let plugin = plugin("nyc3", &droplets, &Arc::new(FakeTagService::new()));

    plugin.destroy(&InstanceId::new("12345")).await.expect("destroy succeeds");

    assert_eq!(droplets.deleted(), vec![12345]);
}

#[tokio::test]
async fn provider_error_is_returned_unchanged() {
    let droplets = Arc::new(FakeDropletService::failing("something went wrong"));
    let plugin = plugin("nyc3", &droplets, &Arc::new(FakeTagService::new()));

    let err = plugin.destroy(&InstanceId::new("12345")).await.unwrap_err();

    assert_eq!(err.to_string(), "something went wrong");
    assert_eq!(droplets.deleted(), vec![12345]);
}

#[tokio::test]
async fn destroy_is_not_masked_when_repeated() {
    let droplets = Arc::new(FakeDropletService::failing(
        "The resource you were accessing could not be found.",
    ));
    let plugin = plugin("nyc3", &droplets, &Arc::new(FakeTagService::new()));
    let id = InstanceId::new("42");

    assert!(plugin.destroy(&id).await.is_err());
    assert!(plugin.destroy(&id).await.is_err());
    assert_eq!(droplets.delete_calls(), 2);
}

//! Registry garbage collection
//!
//! Deleting tags and manifests only unreferences blobs; a garbage
//! collection run reclaims the space. A run is the registry's pollable
//! asynchronous operation: start it, then wait for it to finish.

use crate::registry::RegistryName;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use oceankit_core::error::Result;
use oceankit_core::traits::Resource;
use oceankit_core::transport::ApiClient;
use oceankit_core::{poll, Backoff};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum GcStatus {
    #[serde(rename = "requested")]
    Requested,
    #[serde(rename = "waiting for write JWTs to expire")]
    WaitingForWriteJwts,
    #[serde(rename = "scanning manifests")]
    ScanningManifests,
    #[serde(rename = "deleting unreferenced blobs")]
    DeletingUnreferencedBlobs,
    #[serde(rename = "cancelling")]
    Cancelling,
    #[serde(rename = "cancelled")]
    Cancelled,
    #[serde(rename = "failed")]
    Failed,
    #[serde(rename = "succeeded")]
    Succeeded,
}

/// A garbage collection run
#[derive(Debug, Clone, Deserialize)]
pub struct GarbageCollection {
    uuid: String,
    registry_name: RegistryName,
    status: GcStatus,
    #[serde(default)]
    blobs_deleted: u64,
    #[serde(default)]
    freed_bytes: u64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl GarbageCollection {
    pub fn uuid(&self) -> &str {
        &self.uuid
    }

    pub fn registry_name(&self) -> &RegistryName {
        &self.registry_name
    }

    pub fn blobs_deleted(&self) -> u64 {
        self.blobs_deleted
    }

    pub fn freed_bytes(&self) -> u64 {
        self.freed_bytes
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Kick off a run; the registry is read-only for writes until it ends
    pub async fn start(client: &ApiClient, registry: &RegistryName) -> Result<Self> {
        tracing::info!(%registry, "starting registry garbage collection");
        let body = client
            .post(&format!("/v2/registry/{registry}/garbage-collection"), json!({}))
            .await?;
        let node = oceankit_core::json::envelope(body, "garbage_collection")?;
        Ok(serde_json::from_value(node)?)
    }

    /// The currently active run, if any; a 404 means nothing is running
    pub async fn active(client: &ApiClient, registry: &RegistryName) -> Result<Self> {
        Self::fetch(client, registry).await
    }

    /// Block until the active run disappears, which is how the API reports
    /// a finished collection. Garbage collection is slow; budgets of many
    /// minutes are normal, so the backoff starts wider than the default
    pub async fn wait_finished(
        client: &ApiClient,
        registry: &RegistryName,
        budget: Duration,
    ) -> Result<()> {
        let backoff = Backoff {
            initial: Duration::from_secs(10),
            cap: Duration::from_secs(60),
        };
        poll::wait_until_gone_with::<Self>(client, registry, budget, backoff).await
    }

    /// Block until the active run reports `succeeded`
    pub async fn wait_succeeded(
        client: &ApiClient,
        registry: &RegistryName,
        budget: Duration,
    ) -> Result<Self> {
        poll::wait_for(client, registry, GcStatus::Succeeded, budget).await
    }
}

#[async_trait]
impl Resource for GarbageCollection {
    /// Runs are addressed through their registry; only one can be active
    type Id = RegistryName;
    type Status = GcStatus;

    fn kind() -> &'static str {
        "garbage collection"
    }

    fn id(&self) -> &RegistryName {
        &self.registry_name
    }

    fn status(&self) -> GcStatus {
        self.status
    }

    async fn fetch(client: &ApiClient, id: &RegistryName) -> Result<Self> {
        let node = client
            .get_resource(
                &format!("/v2/registry/{id}/garbage-collection"),
                "garbage_collection",
                "garbage collection",
                id,
            )
            .await?;
        Ok(serde_json::from_value(node)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_strings_follow_the_server_wording() {
        let gc: GarbageCollection = serde_json::from_value(json!({
            "uuid": "eff0823c-cf9b-4a67-aea8-89151ceca0d5",
            "registry_name": "acme-images",
            "status": "waiting for write JWTs to expire",
            "created_at": "2020-10-30T21:03:24Z",
            "updated_at": "2020-10-30T21:03:44Z",
        }))
        .unwrap();
        assert_eq!(gc.status(), GcStatus::WaitingForWriteJwts);
        assert_eq!(gc.registry_name().as_str(), "acme-images");

        assert!(serde_json::from_value::<GcStatus>(json!("succeeded")).is_ok());
        assert!(serde_json::from_value::<GcStatus>(json!("taking a nap")).is_err());
    }
}

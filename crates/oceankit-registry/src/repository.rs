//! Repositories and tags inside a registry

use crate::registry::RegistryName;
use chrono::{DateTime, Utc};
use oceankit_core::error::Result;
use oceankit_core::page;
use oceankit_core::transport::ApiClient;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Repository {
    #[serde(default)]
    registry_name: String,
    name: String,
    #[serde(default)]
    tag_count: u64,
    #[serde(default)]
    latest_tag: Option<RepositoryTag>,
}

impl Repository {
    pub fn registry_name(&self) -> &str {
        &self.registry_name
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tag_count(&self) -> u64 {
        self.tag_count
    }

    pub fn latest_tag(&self) -> Option<&RepositoryTag> {
        self.latest_tag.as_ref()
    }

    pub async fn list(client: &ApiClient, registry: &RegistryName) -> Result<Vec<Self>> {
        page::collect_all(
            client,
            &format!("/v2/registry/{registry}/repositories"),
            "repositories",
        )
        .await
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RepositoryTag {
    #[serde(default)]
    registry_name: String,
    #[serde(default)]
    repository: String,
    tag: String,
    manifest_digest: String,
    #[serde(default)]
    compressed_size_bytes: u64,
    #[serde(default)]
    size_bytes: u64,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
}

impl RepositoryTag {
    pub fn registry_name(&self) -> &str {
        &self.registry_name
    }

    pub fn repository(&self) -> &str {
        &self.repository
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn manifest_digest(&self) -> &str {
        &self.manifest_digest
    }

    pub fn compressed_size_bytes(&self) -> u64 {
        self.compressed_size_bytes
    }

    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    pub async fn list(
        client: &ApiClient,
        registry: &RegistryName,
        repository: &str,
    ) -> Result<Vec<Self>> {
        page::collect_all(
            client,
            &format!("/v2/registry/{registry}/repositories/{repository}/tags"),
            "tags",
        )
        .await
    }

    /// Untag; the underlying manifest stays until garbage collection
    pub async fn delete(
        client: &ApiClient,
        registry: &RegistryName,
        repository: &str,
        tag: &str,
    ) -> Result<()> {
        client
            .delete(&format!(
                "/v2/registry/{registry}/repositories/{repository}/tags/{tag}"
            ))
            .await
    }

    /// Delete a manifest by digest, removing every tag that points at it
    pub async fn delete_manifest(
        client: &ApiClient,
        registry: &RegistryName,
        repository: &str,
        digest: &str,
    ) -> Result<()> {
        client
            .delete(&format!(
                "/v2/registry/{registry}/repositories/{repository}/digests/{digest}"
            ))
            .await
    }
}

//! Account projects

use chrono::{DateTime, Utc};
use oceankit_core::error::Result;
use oceankit_core::page;
use oceankit_core::transport::ApiClient;
use serde::Deserialize;

oceankit_core::string_id!(ProjectId);

#[derive(Debug, Clone, Deserialize)]
pub struct Project {
    id: ProjectId,
    name: String,
    purpose: String,
    #[serde(default)]
    environment: Option<String>,
    #[serde(default)]
    is_default: bool,
    created_at: DateTime<Utc>,
}

impl Project {
    pub fn id(&self) -> &ProjectId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn purpose(&self) -> &str {
        &self.purpose
    }

    pub fn environment(&self) -> Option<&str> {
        self.environment.as_deref()
    }

    pub fn is_default(&self) -> bool {
        self.is_default
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub async fn list(client: &ApiClient) -> Result<Vec<Self>> {
        page::collect_all(client, "/v2/projects", "projects").await
    }

    pub async fn get(client: &ApiClient, id: &ProjectId) -> Result<Self> {
        let node = client
            .get_resource(&format!("/v2/projects/{id}"), "project", "project", id)
            .await?;
        Ok(serde_json::from_value(node)?)
    }

    /// The account's default project
    pub async fn default_project(client: &ApiClient) -> Result<Self> {
        let node = client
            .get_resource("/v2/projects/default", "project", "project", &"default")
            .await?;
        Ok(serde_json::from_value(node)?)
    }

    pub async fn find_by_name(client: &ApiClient, name: &str) -> Result<Option<Self>> {
        page::find_first(client, "/v2/projects", "projects", |p: &Self| p.name == name).await
    }
}

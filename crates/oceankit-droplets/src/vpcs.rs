//! Virtual private cloud networks

use chrono::{DateTime, Utc};
use oceankit_core::error::Result;
use oceankit_core::page;
use oceankit_core::transport::ApiClient;
use serde::Deserialize;

oceankit_core::string_id!(VpcId);

#[derive(Debug, Clone, Deserialize)]
pub struct Vpc {
    id: VpcId,
    name: String,
    region: String,
    ip_range: String,
    #[serde(default)]
    default: bool,
    #[serde(default)]
    description: String,
    created_at: DateTime<Utc>,
}

impl Vpc {
    pub fn id(&self) -> &VpcId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn ip_range(&self) -> &str {
        &self.ip_range
    }

    pub fn is_default(&self) -> bool {
        self.default
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub async fn list(client: &ApiClient) -> Result<Vec<Self>> {
        page::collect_all(client, "/v2/vpcs", "vpcs").await
    }

    pub async fn get(client: &ApiClient, id: &VpcId) -> Result<Self> {
        let node = client
            .get_resource(&format!("/v2/vpcs/{id}"), "vpc", "VPC", id)
            .await?;
        Ok(serde_json::from_value(node)?)
    }

    pub async fn find_by_name(client: &ApiClient, name: &str) -> Result<Option<Self>> {
        page::find_first(client, "/v2/vpcs", "vpcs", |v: &Self| v.name == name).await
    }
}

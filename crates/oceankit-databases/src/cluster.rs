//! Database cluster snapshots and cluster-level operations

use crate::users::DatabaseUser;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use oceankit_core::error::{Error, Result};
use oceankit_core::schedule::MaintenanceWindow;
use oceankit_core::traits::Resource;
use oceankit_core::transport::ApiClient;
use oceankit_core::{page, poll};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::json;
use std::collections::BTreeSet;
use std::time::Duration;

oceankit_core::string_id!(DatabaseId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatabaseStatus {
    Creating,
    Online,
    Resizing,
    Migrating,
    Forking,
}

/// Database engines the API offers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseEngine {
    Pg,
    Mysql,
    Redis,
    Mongodb,
}

impl DatabaseEngine {
    pub fn as_slug(self) -> &'static str {
        match self {
            DatabaseEngine::Pg => "pg",
            DatabaseEngine::Mysql => "mysql",
            DatabaseEngine::Redis => "redis",
            DatabaseEngine::Mongodb => "mongodb",
        }
    }
}

fn maintenance_from_wire<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<MaintenanceWindow>, D::Error> {
    #[derive(Deserialize)]
    struct Wire {
        day: String,
        hour: String,
    }
    let wire: Option<Wire> = Option::deserialize(deserializer)?;
    wire.map(|w| MaintenanceWindow::from_wire(&w.day, &w.hour).map_err(D::Error::custom))
        .transpose()
}

/// Immutable point-in-time view of a database cluster
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseCluster {
    id: DatabaseId,
    name: String,
    engine: DatabaseEngine,
    version: String,
    region: String,
    size: String,
    num_nodes: u32,
    status: DatabaseStatus,
    #[serde(default)]
    tags: BTreeSet<String>,
    #[serde(default, deserialize_with = "maintenance_from_wire")]
    maintenance_window: Option<MaintenanceWindow>,
    #[serde(default)]
    users: Vec<DatabaseUser>,
    #[serde(default)]
    db_names: Vec<String>,
    #[serde(default)]
    private_network_uuid: Option<String>,
    created_at: DateTime<Utc>,
}

impl DatabaseCluster {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn engine(&self) -> DatabaseEngine {
        self.engine
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn size(&self) -> &str {
        &self.size
    }

    pub fn num_nodes(&self) -> u32 {
        self.num_nodes
    }

    pub fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }

    pub fn maintenance_window(&self) -> Option<&MaintenanceWindow> {
        self.maintenance_window.as_ref()
    }

    pub fn users(&self) -> &[DatabaseUser] {
        &self.users
    }

    pub fn user(&self, name: &str) -> Option<&DatabaseUser> {
        self.users.iter().find(|u| u.name() == name)
    }

    pub fn db_names(&self) -> &[String] {
        &self.db_names
    }

    pub fn private_network_uuid(&self) -> Option<&str> {
        self.private_network_uuid.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub async fn get(client: &ApiClient, id: &DatabaseId) -> Result<Self> {
        Self::fetch(client, id).await
    }

    pub async fn list(client: &ApiClient) -> Result<Vec<Self>> {
        page::collect_all(client, "/v2/databases", "databases").await
    }

    pub async fn find_by_name(client: &ApiClient, name: &str) -> Result<Option<Self>> {
        page::find_first(client, "/v2/databases", "databases", |d: &Self| {
            d.name == name
        })
        .await
    }

    pub async fn delete(client: &ApiClient, id: &DatabaseId) -> Result<()> {
        client.delete(&format!("/v2/databases/{id}")).await
    }

    /// Change node count and/or size; the cluster reports `resizing` until
    /// the operation settles
    pub async fn resize(
        client: &ApiClient,
        id: &DatabaseId,
        size: &str,
        num_nodes: u32,
    ) -> Result<()> {
        if size.trim().is_empty() {
            return Err(Error::validation("size slug must not be blank"));
        }
        if num_nodes == 0 {
            return Err(Error::validation("a cluster needs at least one node"));
        }
        tracing::info!(%id, size, num_nodes, "resizing database cluster");
        client
            .put(
                &format!("/v2/databases/{id}/resize"),
                json!({"size": size, "num_nodes": num_nodes}),
            )
            .await?;
        Ok(())
    }

    /// Block until the cluster reports `online`
    pub async fn wait_online(
        client: &ApiClient,
        id: &DatabaseId,
        budget: Duration,
    ) -> Result<Self> {
        poll::wait_for(client, id, DatabaseStatus::Online, budget).await
    }

    /// Block until a deleted cluster is no longer visible
    pub async fn wait_gone(client: &ApiClient, id: &DatabaseId, budget: Duration) -> Result<()> {
        poll::wait_until_gone::<Self>(client, id, budget).await
    }
}

#[async_trait]
impl Resource for DatabaseCluster {
    type Id = DatabaseId;
    type Status = DatabaseStatus;

    fn kind() -> &'static str {
        "database cluster"
    }

    fn id(&self) -> &DatabaseId {
        &self.id
    }

    fn status(&self) -> DatabaseStatus {
        self.status
    }

    async fn fetch(client: &ApiClient, id: &DatabaseId) -> Result<Self> {
        let node = client
            .get_resource(
                &format!("/v2/databases/{id}"),
                "database",
                "database cluster",
                id,
            )
            .await?;
        Ok(serde_json::from_value(node)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_body() -> serde_json::Value {
        json!({
            "id": "9cc10173-e9ea-4176-9dbc-a4cee4c4ff30",
            "name": "backend",
            "engine": "pg",
            "version": "14",
            "region": "nyc3",
            "size": "db-s-2vcpu-4gb",
            "num_nodes": 2,
            "status": "online",
            "tags": ["production"],
            "maintenance_window": {"day": "saturday", "hour": "08:45", "pending": false},
            "users": [{"name": "doadmin", "role": "primary"}],
            "db_names": ["defaultdb"],
            "created_at": "2019-02-01T22:33:47Z",
        })
    }

    #[test]
    fn snapshot_parses_server_shape() {
        let cluster: DatabaseCluster = serde_json::from_value(sample_body()).unwrap();
        assert_eq!(cluster.name(), "backend");
        assert_eq!(cluster.engine(), DatabaseEngine::Pg);
        assert_eq!(cluster.status(), DatabaseStatus::Online);
        assert_eq!(cluster.num_nodes(), 2);
        assert_eq!(cluster.user("doadmin").unwrap().role(), Some("primary"));
        let window = cluster.maintenance_window().unwrap();
        assert_eq!(window.day_str(), "saturday");
        assert_eq!(window.start_hhmm(), "08:45");
    }

    #[test]
    fn absent_maintenance_window_is_allowed() {
        let mut body = sample_body();
        body.as_object_mut().unwrap().remove("maintenance_window");
        let cluster: DatabaseCluster = serde_json::from_value(body).unwrap();
        assert!(cluster.maintenance_window().is_none());
    }
}

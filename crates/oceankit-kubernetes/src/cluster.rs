//! Cluster snapshots and cluster-level operations

use crate::node_pool::NodePool;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use oceankit_core::error::Result;
use oceankit_core::schedule::MaintenanceWindow;
use oceankit_core::traits::Resource;
use oceankit_core::transport::ApiClient;
use oceankit_core::{page, poll};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeSet;
use std::time::Duration;

oceankit_core::string_id!(ClusterId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClusterState {
    Provisioning,
    Running,
    Degraded,
    Error,
    Upgrading,
    Deleting,
    Deleted,
}

#[derive(Debug, Clone, Deserialize)]
struct ClusterStatus {
    state: ClusterState,
    #[serde(default)]
    message: Option<String>,
}

/// Maintenance policy as the cluster endpoints speak it
///
/// Wraps the shared [`MaintenanceWindow`] value object in the
/// `{"day": ..., "start_time": "HH:MM"}` wire shape. Clusters accept
/// `"any"` as the day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaintenancePolicy(pub MaintenanceWindow);

impl MaintenancePolicy {
    pub fn window(&self) -> &MaintenanceWindow {
        &self.0
    }
}

#[derive(Deserialize)]
struct MaintenancePolicyWire {
    day: String,
    start_time: String,
}

impl<'de> Deserialize<'de> for MaintenancePolicy {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let wire = MaintenancePolicyWire::deserialize(deserializer)?;
        let window = MaintenanceWindow::from_wire(&wire.day, &wire.start_time)
            .map_err(D::Error::custom)?;
        Ok(Self(window))
    }
}

impl Serialize for MaintenancePolicy {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;
        let mut out = serializer.serialize_struct("MaintenancePolicy", 2)?;
        out.serialize_field("day", self.0.day_str())?;
        out.serialize_field("start_time", &self.0.start_hhmm())?;
        out.end()
    }
}

/// Immutable point-in-time view of a Kubernetes cluster
#[derive(Debug, Clone, Deserialize)]
pub struct Cluster {
    id: ClusterId,
    name: String,
    region: String,
    version: String,
    #[serde(default)]
    cluster_subnet: String,
    #[serde(default)]
    service_subnet: String,
    #[serde(default)]
    vpc_uuid: Option<String>,
    #[serde(default)]
    endpoint: String,
    #[serde(default)]
    tags: BTreeSet<String>,
    node_pools: Vec<NodePool>,
    #[serde(default)]
    maintenance_policy: Option<MaintenancePolicy>,
    #[serde(default)]
    auto_upgrade: bool,
    #[serde(default)]
    surge_upgrade: bool,
    #[serde(default)]
    ha: bool,
    status: ClusterStatus,
    created_at: DateTime<Utc>,
}

impl Cluster {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn cluster_subnet(&self) -> &str {
        &self.cluster_subnet
    }

    pub fn service_subnet(&self) -> &str {
        &self.service_subnet
    }

    pub fn vpc_uuid(&self) -> Option<&str> {
        self.vpc_uuid.as_deref()
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }

    pub fn node_pools(&self) -> &[NodePool] {
        &self.node_pools
    }

    pub fn node_pool(&self, name: &str) -> Option<&NodePool> {
        self.node_pools.iter().find(|p| p.name() == name)
    }

    pub fn maintenance_window(&self) -> Option<&MaintenanceWindow> {
        self.maintenance_policy.as_ref().map(MaintenancePolicy::window)
    }

    pub fn auto_upgrade(&self) -> bool {
        self.auto_upgrade
    }

    pub fn surge_upgrade(&self) -> bool {
        self.surge_upgrade
    }

    pub fn ha(&self) -> bool {
        self.ha
    }

    pub fn status_message(&self) -> Option<&str> {
        self.status.message.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub async fn get(client: &ApiClient, id: &ClusterId) -> Result<Self> {
        Self::fetch(client, id).await
    }

    pub async fn list(client: &ApiClient) -> Result<Vec<Self>> {
        page::collect_all(client, "/v2/kubernetes/clusters", "kubernetes_clusters").await
    }

    pub async fn find_by_name(client: &ApiClient, name: &str) -> Result<Option<Self>> {
        page::find_first(
            client,
            "/v2/kubernetes/clusters",
            "kubernetes_clusters",
            |c: &Self| c.name == name,
        )
        .await
    }

    /// Delete the cluster, leaving attached volumes and load balancers in
    /// place
    pub async fn delete(client: &ApiClient, id: &ClusterId) -> Result<()> {
        client.delete(&format!("/v2/kubernetes/clusters/{id}")).await
    }

    /// Delete the cluster together with every associated resource. There
    /// is no undo; the endpoint path says as much
    pub async fn destroy_with_associated_resources(
        client: &ApiClient,
        id: &ClusterId,
    ) -> Result<()> {
        tracing::warn!(%id, "destroying cluster together with its associated resources");
        client
            .delete(&format!(
                "/v2/kubernetes/clusters/{id}/destroy_with_associated_resources/dangerous"
            ))
            .await
    }

    /// Fetch the cluster's kubeconfig as raw YAML
    pub async fn kubeconfig(client: &ApiClient, id: &ClusterId) -> Result<String> {
        client
            .get_text(&format!("/v2/kubernetes/clusters/{id}/kubeconfig"))
            .await
    }

    /// Block until the cluster reports `running`
    pub async fn wait_running(
        client: &ApiClient,
        id: &ClusterId,
        budget: Duration,
    ) -> Result<Self> {
        poll::wait_for(client, id, ClusterState::Running, budget).await
    }

    /// Block until a deleted cluster is no longer visible
    pub async fn wait_gone(client: &ApiClient, id: &ClusterId, budget: Duration) -> Result<()> {
        poll::wait_until_gone::<Self>(client, id, budget).await
    }
}

#[async_trait]
impl Resource for Cluster {
    type Id = ClusterId;
    type Status = ClusterState;

    fn kind() -> &'static str {
        "kubernetes cluster"
    }

    fn id(&self) -> &ClusterId {
        &self.id
    }

    fn status(&self) -> ClusterState {
        self.status.state
    }

    async fn fetch(client: &ApiClient, id: &ClusterId) -> Result<Self> {
        let node = client
            .get_resource(
                &format!("/v2/kubernetes/clusters/{id}"),
                "kubernetes_cluster",
                "kubernetes cluster",
                id,
            )
            .await?;
        Ok(serde_json::from_value(node)?)
    }
}

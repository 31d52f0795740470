//! Desired state of a cluster

use crate::cluster::{Cluster, ClusterId, MaintenancePolicy};
use crate::node_pool::NodePoolSpec;
use async_trait::async_trait;
use oceankit_core::error::{Error, Result};
use oceankit_core::schedule::MaintenanceWindow;
use oceankit_core::traits::ResourceSpec;
use oceankit_core::transport::ApiClient;
use serde_json::{json, Value};
use std::collections::BTreeSet;

/// Desired state of a Kubernetes cluster
///
/// Region, version, subnets, VPC and the node-pool identity set are fixed
/// at creation time; before diffing against a live cluster call
/// [`copy_immutable_from`](ResourceSpec::copy_immutable_from). The
/// diffable surface is tags, the maintenance window and the
/// auto-upgrade/surge-upgrade/high-availability flags; flags left unset
/// are not compared and not patched.
#[derive(Debug, Clone)]
pub struct ClusterSpec {
    name: String,
    region: String,
    version: String,
    node_pools: Vec<NodePoolSpec>,
    tags: BTreeSet<String>,
    maintenance: Option<MaintenanceWindow>,
    auto_upgrade: Option<bool>,
    surge_upgrade: Option<bool>,
    ha: Option<bool>,
    vpc_uuid: Option<String>,
    cluster_subnet: Option<String>,
    service_subnet: Option<String>,
}

impl ClusterSpec {
    /// Start a spec with the mandatory fields
    pub fn new(name: &str, region: &str, version: &str) -> Result<Self> {
        validate_cluster_name(name)?;
        if region.trim().is_empty() {
            return Err(Error::validation("region slug must not be blank"));
        }
        if version.trim().is_empty() {
            return Err(Error::validation("version slug must not be blank"));
        }
        Ok(Self {
            name: name.to_string(),
            region: region.to_string(),
            version: version.to_string(),
            node_pools: Vec::new(),
            tags: BTreeSet::new(),
            maintenance: None,
            auto_upgrade: None,
            surge_upgrade: None,
            ha: None,
            vpc_uuid: None,
            cluster_subnet: None,
            service_subnet: None,
        })
    }

    /// Add a node pool; creation requires at least one
    pub fn node_pool(mut self, pool: NodePoolSpec) -> Self {
        self.node_pools.push(pool);
        self
    }

    pub fn tag(mut self, tag: &str) -> Result<Self> {
        if tag.trim().is_empty() {
            return Err(Error::validation("tag must not be blank"));
        }
        self.tags.insert(tag.to_string());
        Ok(self)
    }

    /// Weekly maintenance window; clusters accept an "any day" window
    pub fn maintenance_window(mut self, window: MaintenanceWindow) -> Self {
        self.maintenance = Some(window);
        self
    }

    pub fn auto_upgrade(mut self, enabled: bool) -> Self {
        self.auto_upgrade = Some(enabled);
        self
    }

    pub fn surge_upgrade(mut self, enabled: bool) -> Self {
        self.surge_upgrade = Some(enabled);
        self
    }

    pub fn high_availability(mut self, enabled: bool) -> Self {
        self.ha = Some(enabled);
        self
    }

    pub fn vpc(mut self, vpc_uuid: &str) -> Result<Self> {
        if vpc_uuid.trim().is_empty() {
            return Err(Error::validation("vpc_uuid must not be blank"));
        }
        self.vpc_uuid = Some(vpc_uuid.to_string());
        Ok(self)
    }

    pub fn subnets(mut self, cluster_subnet: &str, service_subnet: &str) -> Result<Self> {
        validate_cidr(cluster_subnet)?;
        validate_cidr(service_subnet)?;
        self.cluster_subnet = Some(cluster_subnet.to_string());
        self.service_subnet = Some(service_subnet.to_string());
        Ok(self)
    }

    /// Submit this spec, detecting a name conflict with an existing
    /// cluster. Creation requires at least one node pool
    pub async fn create(
        &self,
        client: &ApiClient,
    ) -> Result<oceankit_core::CreateOutcome<Cluster>> {
        if self.node_pools.is_empty() {
            return Err(Error::validation(
                "a cluster needs at least one node pool at creation time",
            ));
        }
        oceankit_core::create(client, self).await
    }

    /// The identity set of this spec's pools: (name, size) pairs
    fn pool_identities(&self) -> BTreeSet<(String, String)> {
        self.node_pools
            .iter()
            .map(|p| (p.name().to_string(), p.size().to_string()))
            .collect()
    }
}

#[async_trait]
impl ResourceSpec for ClusterSpec {
    type Snapshot = Cluster;

    fn display_name(&self) -> &str {
        &self.name
    }

    fn create_uri(&self) -> String {
        "/v2/kubernetes/clusters".to_string()
    }

    fn update_uri(&self, id: &ClusterId) -> String {
        format!("/v2/kubernetes/clusters/{id}")
    }

    fn envelope() -> &'static str {
        "kubernetes_cluster"
    }

    fn create_body(&self) -> Value {
        let mut body = json!({
            "name": self.name,
            "region": self.region,
            "version": self.version,
            "node_pools": self.node_pools.iter().map(|p| p.create_body()).collect::<Vec<_>>(),
            "tags": self.tags,
        });
        let map = body.as_object_mut().expect("body is an object");
        if let Some(window) = &self.maintenance {
            map.insert(
                "maintenance_policy".to_string(),
                json!(MaintenancePolicy(*window)),
            );
        }
        if let Some(auto_upgrade) = self.auto_upgrade {
            map.insert("auto_upgrade".to_string(), json!(auto_upgrade));
        }
        if let Some(surge_upgrade) = self.surge_upgrade {
            map.insert("surge_upgrade".to_string(), json!(surge_upgrade));
        }
        if let Some(ha) = self.ha {
            map.insert("ha".to_string(), json!(ha));
        }
        if let Some(vpc) = &self.vpc_uuid {
            map.insert("vpc_uuid".to_string(), json!(vpc));
        }
        if let Some(subnet) = &self.cluster_subnet {
            map.insert("cluster_subnet".to_string(), json!(subnet));
        }
        if let Some(subnet) = &self.service_subnet {
            map.insert("service_subnet".to_string(), json!(subnet));
        }
        body
    }

    fn matches(&self, live: &Cluster) -> bool {
        self.tags == *live.tags()
            && self
                .maintenance
                .as_ref()
                .is_none_or(|w| Some(w) == live.maintenance_window())
            && self.auto_upgrade.is_none_or(|v| v == live.auto_upgrade())
            && self.surge_upgrade.is_none_or(|v| v == live.surge_upgrade())
            && self.ha.is_none_or(|v| v == live.ha())
    }

    fn update_body(&self, live: &Cluster) -> Value {
        let mut patch = serde_json::Map::new();
        if self.tags != *live.tags() {
            patch.insert("tags".to_string(), json!(self.tags));
        }
        if let Some(window) = &self.maintenance {
            if Some(window) != live.maintenance_window() {
                patch.insert(
                    "maintenance_policy".to_string(),
                    json!(MaintenancePolicy(*window)),
                );
            }
        }
        if let Some(auto_upgrade) = self.auto_upgrade {
            if auto_upgrade != live.auto_upgrade() {
                patch.insert("auto_upgrade".to_string(), json!(auto_upgrade));
            }
        }
        if let Some(surge_upgrade) = self.surge_upgrade {
            if surge_upgrade != live.surge_upgrade() {
                patch.insert("surge_upgrade".to_string(), json!(surge_upgrade));
            }
        }
        if let Some(ha) = self.ha {
            if ha != live.ha() {
                patch.insert("ha".to_string(), json!(ha));
            }
        }
        Value::Object(patch)
    }

    fn immutable_conflicts(&self, live: &Cluster) -> Vec<&'static str> {
        let mut conflicts = Vec::new();
        if self.region != live.region() {
            conflicts.push("region");
        }
        if self.version != live.version() {
            conflicts.push("version");
        }
        if let Some(subnet) = &self.cluster_subnet {
            if subnet != live.cluster_subnet() {
                conflicts.push("cluster_subnet");
            }
        }
        if let Some(subnet) = &self.service_subnet {
            if subnet != live.service_subnet() {
                conflicts.push("service_subnet");
            }
        }
        if self.vpc_uuid.is_some() && self.vpc_uuid.as_deref() != live.vpc_uuid() {
            conflicts.push("vpc_uuid");
        }
        if !self.node_pools.is_empty() {
            let live_identities: BTreeSet<(String, String)> = live
                .node_pools()
                .iter()
                .map(|p| (p.name().to_string(), p.size().to_string()))
                .collect();
            if self.pool_identities() != live_identities {
                conflicts.push("node_pools");
            }
        }
        conflicts
    }

    fn copy_immutable_from(&mut self, live: &Cluster) {
        self.region = live.region().to_string();
        self.version = live.version().to_string();
        self.cluster_subnet = Some(live.cluster_subnet().to_string());
        self.service_subnet = Some(live.service_subnet().to_string());
        self.vpc_uuid = live.vpc_uuid().map(ToString::to_string);
        self.node_pools = live
            .node_pools()
            .iter()
            .map(|p| {
                NodePoolSpec::new(p.name(), p.size(), p.count().max(1))
                    .expect("live pool fields are valid")
            })
            .collect();
    }

    fn is_name_conflict(&self, message: &str) -> bool {
        message
            .to_lowercase()
            .contains("a cluster with this name already exists")
    }

    async fn find_existing(&self, client: &ApiClient) -> Result<Option<Cluster>> {
        Cluster::find_by_name(client, &self.name).await
    }
}

/// Cluster and pool names: lowercase alphanumerics and hyphens, starting
/// with a letter, at most 63 characters
pub(crate) fn validate_cluster_name(name: &str) -> Result<()> {
    if name.is_empty() || name.len() > 63 {
        return Err(Error::validation(format!(
            "name must be 1-63 characters: {name:?}"
        )));
    }
    if !name.chars().next().is_some_and(|c| c.is_ascii_lowercase()) {
        return Err(Error::validation(format!(
            "name must start with a lowercase letter: {name:?}"
        )));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(Error::validation(format!(
            "name may only contain lowercase alphanumerics and hyphens: {name:?}"
        )));
    }
    Ok(())
}

fn validate_cidr(subnet: &str) -> Result<()> {
    let valid = match subnet.split_once('/') {
        Some((addr, prefix)) => {
            addr.parse::<std::net::Ipv4Addr>().is_ok()
                && prefix.parse::<u8>().is_ok_and(|p| p <= 32)
        }
        None => false,
    };
    if !valid {
        return Err(Error::validation(format!(
            "subnet must be IPv4 CIDR notation: {subnet:?}"
        )));
    }
    Ok(())
}

//! Node pools: cluster-owned child resources
//!
//! Pools live inside their parent cluster snapshot; equality and hashing
//! follow the pool's own stable id.

use crate::cluster::ClusterId;
use oceankit_core::error::{Error, Result};
use oceankit_core::transport::ApiClient;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::hash::{Hash, Hasher};

oceankit_core::string_id!(NodePoolId);

/// Node taint
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Taint {
    pub key: String,
    pub value: String,
    pub effect: String,
}

/// A worker pool as owned by a cluster snapshot
#[derive(Debug, Clone, Deserialize)]
pub struct NodePool {
    id: NodePoolId,
    name: String,
    size: String,
    count: u32,
    #[serde(default)]
    tags: BTreeSet<String>,
    #[serde(default)]
    labels: Option<BTreeMap<String, String>>,
    #[serde(default)]
    taints: Vec<Taint>,
    #[serde(default)]
    auto_scale: bool,
    #[serde(default)]
    min_nodes: u32,
    #[serde(default)]
    max_nodes: u32,
}

impl NodePool {
    pub fn id(&self) -> &NodePoolId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> &str {
        &self.size
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }

    pub fn labels(&self) -> Option<&BTreeMap<String, String>> {
        self.labels.as_ref()
    }

    pub fn taints(&self) -> &[Taint] {
        &self.taints
    }

    pub fn auto_scale(&self) -> bool {
        self.auto_scale
    }

    pub fn min_nodes(&self) -> u32 {
        self.min_nodes
    }

    pub fn max_nodes(&self) -> u32 {
        self.max_nodes
    }

    /// Add a pool to an existing cluster
    pub async fn add(
        client: &ApiClient,
        cluster: &ClusterId,
        spec: &NodePoolSpec,
    ) -> Result<Self> {
        let body = client
            .post(
                &format!("/v2/kubernetes/clusters/{cluster}/node_pools"),
                spec.create_body(),
            )
            .await?;
        let node = oceankit_core::json::envelope(body, "node_pool")?;
        Ok(serde_json::from_value(node)?)
    }

    /// Resize an existing pool
    pub async fn resize(
        client: &ApiClient,
        cluster: &ClusterId,
        pool: &NodePoolId,
        count: u32,
    ) -> Result<()> {
        client
            .put(
                &format!("/v2/kubernetes/clusters/{cluster}/node_pools/{pool}"),
                json!({"count": count}),
            )
            .await?;
        Ok(())
    }

    pub async fn delete(
        client: &ApiClient,
        cluster: &ClusterId,
        pool: &NodePoolId,
    ) -> Result<()> {
        client
            .delete(&format!(
                "/v2/kubernetes/clusters/{cluster}/node_pools/{pool}"
            ))
            .await
    }
}

// Identity follows the pool's stable id, not its full field tuple
impl PartialEq for NodePool {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for NodePool {}

impl Hash for NodePool {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Desired state of one node pool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodePoolSpec {
    name: String,
    size: String,
    count: u32,
    tags: BTreeSet<String>,
    labels: BTreeMap<String, String>,
    taints: Vec<Taint>,
    auto_scale: Option<(u32, u32)>,
}

impl NodePoolSpec {
    pub fn new(name: &str, size: &str, count: u32) -> Result<Self> {
        crate::spec::validate_cluster_name(name)?;
        if size.trim().is_empty() {
            return Err(Error::validation("node pool size slug must not be blank"));
        }
        if count == 0 {
            return Err(Error::validation("node pool must have at least one node"));
        }
        Ok(Self {
            name: name.to_string(),
            size: size.to_string(),
            count,
            tags: BTreeSet::new(),
            labels: BTreeMap::new(),
            taints: Vec::new(),
            auto_scale: None,
        })
    }

    pub fn tag(mut self, tag: &str) -> Result<Self> {
        if tag.trim().is_empty() {
            return Err(Error::validation("node pool tag must not be blank"));
        }
        self.tags.insert(tag.to_string());
        Ok(self)
    }

    pub fn label(mut self, key: &str, value: &str) -> Result<Self> {
        if key.trim().is_empty() {
            return Err(Error::validation("label key must not be blank"));
        }
        self.labels.insert(key.to_string(), value.to_string());
        Ok(self)
    }

    pub fn taint(mut self, taint: Taint) -> Self {
        self.taints.push(taint);
        self
    }

    /// Enable autoscaling between `min` and `max` nodes
    pub fn auto_scale(mut self, min: u32, max: u32) -> Result<Self> {
        if min == 0 || min > max {
            return Err(Error::validation(format!(
                "autoscale bounds must satisfy 1 <= min <= max, got {min}..{max}"
            )));
        }
        self.auto_scale = Some((min, max));
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> &str {
        &self.size
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub(crate) fn create_body(&self) -> Value {
        let mut body = json!({
            "name": self.name,
            "size": self.size,
            "count": self.count,
        });
        let map = body.as_object_mut().expect("body is an object");
        if !self.tags.is_empty() {
            map.insert("tags".to_string(), json!(self.tags));
        }
        if !self.labels.is_empty() {
            map.insert("labels".to_string(), json!(self.labels));
        }
        if !self.taints.is_empty() {
            map.insert("taints".to_string(), json!(self.taints));
        }
        if let Some((min, max)) = self.auto_scale {
            map.insert("auto_scale".to_string(), json!(true));
            map.insert("min_nodes".to_string(), json!(min));
            map.insert("max_nodes".to_string(), json!(max));
        }
        body
    }
}

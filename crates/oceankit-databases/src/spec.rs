//! Desired state of a database cluster

use crate::cluster::{DatabaseCluster, DatabaseEngine, DatabaseId};
use async_trait::async_trait;
use oceankit_core::error::{Error, Result};
use oceankit_core::schedule::MaintenanceWindow;
use oceankit_core::traits::ResourceSpec;
use oceankit_core::transport::ApiClient;
use serde_json::{json, Value};
use std::collections::BTreeSet;

/// Desired state of a database cluster
///
/// Engine, version and region are fixed at creation time. The generic
/// diff covers the maintenance window only, routed through the dedicated
/// `PUT /v2/databases/{id}/maintenance` endpoint; node count and size
/// changes go through [`DatabaseCluster::resize`] explicitly.
#[derive(Debug, Clone)]
pub struct DatabaseSpec {
    name: String,
    engine: DatabaseEngine,
    version: String,
    size: String,
    region: String,
    num_nodes: u32,
    tags: BTreeSet<String>,
    maintenance: Option<MaintenanceWindow>,
    private_network_uuid: Option<String>,
}

impl DatabaseSpec {
    /// Start a spec with the mandatory fields
    pub fn new(
        name: &str,
        engine: DatabaseEngine,
        version: &str,
        size: &str,
        region: &str,
        num_nodes: u32,
    ) -> Result<Self> {
        validate_db_name(name)?;
        if version.trim().is_empty() {
            return Err(Error::validation("version must not be blank"));
        }
        if size.trim().is_empty() {
            return Err(Error::validation("size slug must not be blank"));
        }
        if region.trim().is_empty() {
            return Err(Error::validation("region slug must not be blank"));
        }
        if !(1..=10).contains(&num_nodes) {
            return Err(Error::validation(format!(
                "node count must be between 1 and 10, got {num_nodes}"
            )));
        }
        Ok(Self {
            name: name.to_string(),
            engine,
            version: version.to_string(),
            size: size.to_string(),
            region: region.to_string(),
            num_nodes,
            tags: BTreeSet::new(),
            maintenance: None,
            private_network_uuid: None,
        })
    }

    pub fn tag(mut self, tag: &str) -> Result<Self> {
        if tag.trim().is_empty() {
            return Err(Error::validation("tag must not be blank"));
        }
        self.tags.insert(tag.to_string());
        Ok(self)
    }

    /// Weekly maintenance window; databases require a concrete day
    pub fn maintenance_window(mut self, window: MaintenanceWindow) -> Result<Self> {
        if window.day().is_none() {
            return Err(Error::validation(
                "database maintenance windows require a concrete day, not \"any\"",
            ));
        }
        self.maintenance = Some(window);
        Ok(self)
    }

    pub fn private_network(mut self, vpc_uuid: &str) -> Result<Self> {
        if vpc_uuid.trim().is_empty() {
            return Err(Error::validation("vpc_uuid must not be blank"));
        }
        self.private_network_uuid = Some(vpc_uuid.to_string());
        Ok(self)
    }

    /// Submit this spec, detecting a name conflict with an existing
    /// cluster
    pub async fn create(
        &self,
        client: &ApiClient,
    ) -> Result<oceankit_core::CreateOutcome<DatabaseCluster>> {
        oceankit_core::create(client, self).await
    }
}

#[async_trait]
impl ResourceSpec for DatabaseSpec {
    type Snapshot = DatabaseCluster;

    fn display_name(&self) -> &str {
        &self.name
    }

    fn create_uri(&self) -> String {
        "/v2/databases".to_string()
    }

    fn update_uri(&self, id: &DatabaseId) -> String {
        format!("/v2/databases/{id}/maintenance")
    }

    fn envelope() -> &'static str {
        "database"
    }

    fn create_body(&self) -> Value {
        let mut body = json!({
            "name": self.name,
            "engine": self.engine.as_slug(),
            "version": self.version,
            "size": self.size,
            "region": self.region,
            "num_nodes": self.num_nodes,
            "tags": self.tags,
        });
        let map = body.as_object_mut().expect("body is an object");
        if let Some(vpc) = &self.private_network_uuid {
            map.insert("private_network_uuid".to_string(), json!(vpc));
        }
        body
    }

    fn matches(&self, live: &DatabaseCluster) -> bool {
        self.maintenance
            .as_ref()
            .is_none_or(|w| Some(w) == live.maintenance_window())
    }

    fn update_body(&self, live: &DatabaseCluster) -> Value {
        match &self.maintenance {
            Some(window) if Some(window) != live.maintenance_window() => json!({
                "day": window.day_str(),
                "hour": window.start_hhmm(),
            }),
            _ => Value::Object(serde_json::Map::new()),
        }
    }

    fn immutable_conflicts(&self, live: &DatabaseCluster) -> Vec<&'static str> {
        let mut conflicts = Vec::new();
        if self.engine != live.engine() {
            conflicts.push("engine");
        }
        if self.version != live.version() {
            conflicts.push("version");
        }
        if self.region != live.region() {
            conflicts.push("region");
        }
        conflicts
    }

    fn copy_immutable_from(&mut self, live: &DatabaseCluster) {
        self.engine = live.engine();
        self.version = live.version().to_string();
        self.region = live.region().to_string();
    }

    fn is_name_conflict(&self, message: &str) -> bool {
        let message = message.to_lowercase();
        message.contains("cluster name is not available")
            || message.contains("already exists")
    }

    async fn find_existing(&self, client: &ApiClient) -> Result<Option<DatabaseCluster>> {
        DatabaseCluster::find_by_name(client, &self.name).await
    }
}

/// Database cluster names: 3-63 characters, lowercase alphanumerics and
/// hyphens, starting with a letter
fn validate_db_name(name: &str) -> Result<()> {
    if name.len() < 3 || name.len() > 63 {
        return Err(Error::validation(format!(
            "database name must be 3-63 characters: {name:?}"
        )));
    }
    if !name.chars().next().is_some_and(|c| c.is_ascii_lowercase()) {
        return Err(Error::validation(format!(
            "database name must start with a lowercase letter: {name:?}"
        )));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(Error::validation(format!(
            "database name may only contain lowercase alphanumerics and hyphens: {name:?}"
        )));
    }
    Ok(())
}

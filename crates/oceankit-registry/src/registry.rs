//! The account's container registry
//!
//! Each account holds at most one registry, addressed by its globally
//! unique name. The registry has no mutable surface, so reconciliation
//! reduces to the create-or-conflict half of the protocol.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use oceankit_core::error::{Error, Result};
use oceankit_core::traits::{Resource, ResourceSpec};
use oceankit_core::transport::ApiClient;
use serde::Deserialize;
use serde_json::{json, Value};

oceankit_core::string_id!(RegistryName);

/// Immutable point-in-time view of the account's registry
#[derive(Debug, Clone, Deserialize)]
pub struct Registry {
    name: RegistryName,
    #[serde(default)]
    region: Option<String>,
    #[serde(default)]
    storage_usage_bytes: u64,
    created_at: DateTime<Utc>,
}

impl Registry {
    pub fn name(&self) -> &RegistryName {
        &self.name
    }

    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    pub fn storage_usage_bytes(&self) -> u64 {
        self.storage_usage_bytes
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// The account's registry, whatever its name
    pub async fn current(client: &ApiClient) -> Result<Self> {
        let body = client.get("/v2/registry").await?;
        let node = oceankit_core::json::envelope(body, "registry")?;
        Ok(serde_json::from_value(node)?)
    }

    /// Delete the account's registry and every repository in it
    pub async fn delete(client: &ApiClient) -> Result<()> {
        client.delete("/v2/registry").await
    }
}

#[async_trait]
impl Resource for Registry {
    type Id = RegistryName;
    type Status = ();

    fn kind() -> &'static str {
        "container registry"
    }

    fn id(&self) -> &RegistryName {
        &self.name
    }

    fn status(&self) {}

    /// The registry endpoint is a singleton; fetching "by id" verifies the
    /// account's registry actually carries the requested name
    async fn fetch(client: &ApiClient, id: &RegistryName) -> Result<Self> {
        let registry = match Self::current(client).await {
            Ok(registry) => registry,
            Err(Error::NotFound(_)) => {
                return Err(Error::not_found(format!("container registry {id}")));
            }
            Err(e) => return Err(e),
        };
        if registry.name != *id {
            return Err(Error::not_found(format!("container registry {id}")));
        }
        Ok(registry)
    }
}

/// Desired state of the account's registry
#[derive(Debug, Clone)]
pub struct RegistrySpec {
    name: String,
    subscription_tier: String,
    region: Option<String>,
}

impl RegistrySpec {
    /// Registry names are globally unique: 6-63 lowercase alphanumerics
    /// and hyphens
    pub fn new(name: &str) -> Result<Self> {
        validate_registry_name(name)?;
        Ok(Self {
            name: name.to_string(),
            subscription_tier: "basic".to_string(),
            region: None,
        })
    }

    pub fn subscription_tier(mut self, tier: &str) -> Result<Self> {
        if tier.trim().is_empty() {
            return Err(Error::validation("subscription tier must not be blank"));
        }
        self.subscription_tier = tier.to_string();
        Ok(self)
    }

    pub fn region(mut self, region: &str) -> Result<Self> {
        if region.trim().is_empty() {
            return Err(Error::validation("region slug must not be blank"));
        }
        self.region = Some(region.to_string());
        Ok(self)
    }

    /// Submit this spec; the name is globally unique, so a conflict may
    /// even come from another account's registry, in which case the
    /// conflict lookup legitimately comes up empty and surfaces as a
    /// protocol error
    pub async fn create(
        &self,
        client: &ApiClient,
    ) -> Result<oceankit_core::CreateOutcome<Registry>> {
        oceankit_core::create(client, self).await
    }
}

#[async_trait]
impl ResourceSpec for RegistrySpec {
    type Snapshot = Registry;

    fn display_name(&self) -> &str {
        &self.name
    }

    fn create_uri(&self) -> String {
        "/v2/registry".to_string()
    }

    fn update_uri(&self, _id: &RegistryName) -> String {
        "/v2/registry".to_string()
    }

    fn envelope() -> &'static str {
        "registry"
    }

    fn create_body(&self) -> Value {
        let mut body = json!({
            "name": self.name,
            "subscription_tier_slug": self.subscription_tier,
        });
        if let Some(region) = &self.region {
            body.as_object_mut()
                .expect("body is an object")
                .insert("region".to_string(), json!(region));
        }
        body
    }

    /// The registry has no mutable fields; a live registry with the right
    /// name always matches
    fn matches(&self, live: &Registry) -> bool {
        self.name == live.name.as_str()
    }

    fn update_body(&self, _live: &Registry) -> Value {
        Value::Object(serde_json::Map::new())
    }

    fn immutable_conflicts(&self, live: &Registry) -> Vec<&'static str> {
        let mut conflicts = Vec::new();
        if self.name != live.name.as_str() {
            conflicts.push("name");
        }
        if self.region.is_some() && self.region.as_deref() != live.region() {
            conflicts.push("region");
        }
        conflicts
    }

    fn copy_immutable_from(&mut self, live: &Registry) {
        self.name = live.name.as_str().to_string();
        self.region = live.region().map(ToString::to_string);
    }

    fn is_name_conflict(&self, message: &str) -> bool {
        let message = message.to_lowercase();
        message.contains("name is already in use") || message.contains("already exists")
    }

    /// The only registry visible to this client is the account's own; any
    /// other holder of the name is invisible by design
    async fn find_existing(&self, client: &ApiClient) -> Result<Option<Registry>> {
        match Registry::current(client).await {
            Ok(registry) if registry.name.as_str() == self.name => Ok(Some(registry)),
            Ok(_) => Ok(None),
            Err(Error::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

fn validate_registry_name(name: &str) -> Result<()> {
    if name.len() < 6 || name.len() > 63 {
        return Err(Error::validation(format!(
            "registry name must be 6-63 characters: {name:?}"
        )));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        || name.starts_with('-')
        || name.ends_with('-')
    {
        return Err(Error::validation(format!(
            "registry name may only contain lowercase alphanumerics and inner hyphens: {name:?}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_registry() -> Registry {
        serde_json::from_value(json!({
            "name": "acme-images",
            "region": "fra1",
            "storage_usage_bytes": 29393920,
            "created_at": "2020-03-21T16:02:37Z",
        }))
        .unwrap()
    }

    #[test]
    fn name_validation() {
        assert!(RegistrySpec::new("acme-images").is_ok());
        assert!(RegistrySpec::new("short").is_err());
        assert!(RegistrySpec::new("Acme-Images").is_err());
        assert!(RegistrySpec::new("-acme-images").is_err());
        assert!(RegistrySpec::new(&"a".repeat(64)).is_err());
    }

    #[test]
    fn the_registry_has_no_mutable_surface() {
        let live = sample_registry();
        let spec = RegistrySpec::new("acme-images").unwrap();
        assert!(spec.matches(&live));
        assert_eq!(spec.update_body(&live), json!({}));
    }

    #[test]
    fn create_body_shape() {
        let body = RegistrySpec::new("acme-images")
            .unwrap()
            .region("fra1")
            .unwrap()
            .create_body();
        assert_eq!(body["name"], "acme-images");
        assert_eq!(body["subscription_tier_slug"], "basic");
        assert_eq!(body["region"], "fra1");
    }

    #[test]
    fn conflict_phrases() {
        let spec = RegistrySpec::new("acme-images").unwrap();
        assert!(spec.is_name_conflict("name is already in use"));
        assert!(!spec.is_name_conflict("invalid subscription tier"));
    }
}

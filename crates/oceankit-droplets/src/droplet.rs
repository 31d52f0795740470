//! Droplet snapshots and desired-state specs

use crate::vpcs::VpcId;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use oceankit_core::error::{Error, Result};
use oceankit_core::traits::{Resource, ResourceSpec};
use oceankit_core::transport::ApiClient;
use oceankit_core::{page, poll};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::BTreeSet;
use std::time::Duration;

oceankit_core::int_id!(DropletId);

/// Largest accepted cloud-init payload
const MAX_USER_DATA_BYTES: usize = 64 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropletStatus {
    New,
    Active,
    Off,
    Archive,
}

/// Region as embedded in a droplet body
#[derive(Debug, Clone, Deserialize)]
pub struct RegionRef {
    pub slug: String,
    #[serde(default)]
    pub name: String,
}

/// Image as embedded in a droplet body; custom images have no slug
#[derive(Debug, Clone, Deserialize)]
pub struct ImageRef {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub name: String,
}

impl ImageRef {
    /// The identifier a spec would use for this image: the slug when the
    /// server exposes one, the numeric id otherwise
    fn reference(&self) -> String {
        match (&self.slug, self.id) {
            (Some(slug), _) => slug.clone(),
            (None, Some(id)) => id.to_string(),
            (None, None) => String::new(),
        }
    }
}

/// Immutable point-in-time view of a droplet
///
/// Constructed by parsing a server response; never mutated. Observe newer
/// state with [`reload`](Resource::reload).
#[derive(Debug, Clone, Deserialize)]
pub struct Droplet {
    id: DropletId,
    name: String,
    status: DropletStatus,
    region: RegionRef,
    size_slug: String,
    image: ImageRef,
    #[serde(default)]
    tags: BTreeSet<String>,
    #[serde(default)]
    features: BTreeSet<String>,
    #[serde(default)]
    vpc_uuid: Option<VpcId>,
    #[serde(default)]
    locked: bool,
    created_at: DateTime<Utc>,
}

impl Droplet {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn region_slug(&self) -> &str {
        &self.region.slug
    }

    pub fn size_slug(&self) -> &str {
        &self.size_slug
    }

    pub fn image(&self) -> &ImageRef {
        &self.image
    }

    pub fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }

    pub fn vpc_uuid(&self) -> Option<&VpcId> {
        self.vpc_uuid.as_ref()
    }

    pub fn locked(&self) -> bool {
        self.locked
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn has_feature(&self, feature: &str) -> bool {
        self.features.contains(feature)
    }

    pub async fn get(client: &ApiClient, id: DropletId) -> Result<Self> {
        Self::fetch(client, &id).await
    }

    pub async fn list(client: &ApiClient) -> Result<Vec<Self>> {
        page::collect_all(client, "/v2/droplets", "droplets").await
    }

    pub async fn list_by_tag(client: &ApiClient, tag: &str) -> Result<Vec<Self>> {
        page::collect_all(
            client,
            &format!("/v2/droplets?tag_name={tag}"),
            "droplets",
        )
        .await
    }

    pub async fn find_by_name(client: &ApiClient, name: &str) -> Result<Option<Self>> {
        page::find_first(client, "/v2/droplets", "droplets", |d: &Self| d.name == name).await
    }

    pub async fn delete(client: &ApiClient, id: DropletId) -> Result<()> {
        tracing::debug!(%id, "deleting droplet");
        client.delete(&format!("/v2/droplets/{id}")).await
    }

    /// Block until the droplet reports `active`
    pub async fn wait_active(client: &ApiClient, id: DropletId, budget: Duration) -> Result<Self> {
        poll::wait_for(client, &id, DropletStatus::Active, budget).await
    }

    /// Block until a destroyed droplet is no longer visible
    pub async fn wait_gone(client: &ApiClient, id: DropletId, budget: Duration) -> Result<()> {
        poll::wait_until_gone::<Self>(client, &id, budget).await
    }
}

#[async_trait]
impl Resource for Droplet {
    type Id = DropletId;
    type Status = DropletStatus;

    fn kind() -> &'static str {
        "droplet"
    }

    fn id(&self) -> &DropletId {
        &self.id
    }

    fn status(&self) -> DropletStatus {
        self.status
    }

    async fn fetch(client: &ApiClient, id: &DropletId) -> Result<Self> {
        let node = client
            .get_resource(&format!("/v2/droplets/{id}"), "droplet", "droplet", id)
            .await?;
        Ok(serde_json::from_value(node)?)
    }
}

/// Desired state of a droplet
///
/// Every setter validates its argument immediately; the spec never holds
/// invalid data. Region, size, image and VPC are fixed at creation time;
/// before diffing against a live droplet call
/// [`copy_immutable_from`](ResourceSpec::copy_immutable_from).
#[derive(Debug, Clone)]
pub struct DropletSpec {
    name: String,
    region: String,
    size: String,
    image: String,
    ssh_keys: Vec<String>,
    tags: BTreeSet<String>,
    backups: Option<bool>,
    ipv6: Option<bool>,
    monitoring: Option<bool>,
    vpc_uuid: Option<VpcId>,
    user_data: Option<String>,
}

impl DropletSpec {
    /// Start a spec with the mandatory fields
    pub fn new(name: &str, region: &str, size: &str, image: &str) -> Result<Self> {
        validate_name(name)?;
        validate_slug("region", region)?;
        validate_slug("size", size)?;
        validate_slug("image", image)?;
        Ok(Self {
            name: name.to_string(),
            region: region.to_string(),
            size: size.to_string(),
            image: image.to_string(),
            ssh_keys: Vec::new(),
            tags: BTreeSet::new(),
            backups: None,
            ipv6: None,
            monitoring: None,
            vpc_uuid: None,
            user_data: None,
        })
    }

    /// Add one tag
    pub fn tag(mut self, tag: &str) -> Result<Self> {
        validate_tag(tag)?;
        self.tags.insert(tag.to_string());
        Ok(self)
    }

    /// Replace the tag set
    pub fn tags<I, S>(mut self, tags: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut validated = BTreeSet::new();
        for tag in tags {
            validate_tag(tag.as_ref())?;
            validated.insert(tag.as_ref().to_string());
        }
        self.tags = validated;
        Ok(self)
    }

    /// Add an SSH key by numeric id or fingerprint
    pub fn ssh_key(mut self, key: &str) -> Result<Self> {
        if key.trim().is_empty() {
            return Err(Error::validation("SSH key reference must not be blank"));
        }
        self.ssh_keys.push(key.to_string());
        Ok(self)
    }

    pub fn backups(mut self, enabled: bool) -> Self {
        self.backups = Some(enabled);
        self
    }

    pub fn ipv6(mut self, enabled: bool) -> Self {
        self.ipv6 = Some(enabled);
        self
    }

    pub fn monitoring(mut self, enabled: bool) -> Self {
        self.monitoring = Some(enabled);
        self
    }

    pub fn vpc(mut self, vpc: VpcId) -> Self {
        self.vpc_uuid = Some(vpc);
        self
    }

    /// Cloud-init payload, at most 64 KiB
    pub fn user_data(mut self, data: &str) -> Result<Self> {
        if data.len() > MAX_USER_DATA_BYTES {
            return Err(Error::validation(format!(
                "user data exceeds {MAX_USER_DATA_BYTES} bytes"
            )));
        }
        self.user_data = Some(data.to_string());
        Ok(self)
    }

    /// Submit this spec, detecting a name conflict with an existing droplet
    pub async fn create(
        &self,
        client: &ApiClient,
    ) -> Result<oceankit_core::CreateOutcome<Droplet>> {
        oceankit_core::create(client, self).await
    }
}

#[async_trait]
impl ResourceSpec for DropletSpec {
    type Snapshot = Droplet;

    fn display_name(&self) -> &str {
        &self.name
    }

    fn create_uri(&self) -> String {
        "/v2/droplets".to_string()
    }

    fn update_uri(&self, id: &DropletId) -> String {
        format!("/v2/droplets/{id}")
    }

    fn envelope() -> &'static str {
        "droplet"
    }

    fn create_body(&self) -> Value {
        let mut body = json!({
            "name": self.name,
            "region": self.region,
            "size": self.size,
            "image": self.image,
            "tags": self.tags,
        });
        let map = body.as_object_mut().expect("body is an object");
        if !self.ssh_keys.is_empty() {
            map.insert("ssh_keys".to_string(), json!(self.ssh_keys));
        }
        if let Some(backups) = self.backups {
            map.insert("backups".to_string(), json!(backups));
        }
        if let Some(ipv6) = self.ipv6 {
            map.insert("ipv6".to_string(), json!(ipv6));
        }
        if let Some(monitoring) = self.monitoring {
            map.insert("monitoring".to_string(), json!(monitoring));
        }
        if let Some(vpc) = &self.vpc_uuid {
            map.insert("vpc_uuid".to_string(), json!(vpc));
        }
        if let Some(user_data) = &self.user_data {
            map.insert("user_data".to_string(), json!(user_data));
        }
        body
    }

    fn matches(&self, live: &Droplet) -> bool {
        self.name == live.name
            && self.tags == live.tags
            && self
                .backups
                .is_none_or(|v| v == live.has_feature("backups"))
            && self.ipv6.is_none_or(|v| v == live.has_feature("ipv6"))
            && self
                .monitoring
                .is_none_or(|v| v == live.has_feature("monitoring"))
    }

    fn update_body(&self, live: &Droplet) -> Value {
        let mut patch = serde_json::Map::new();
        if self.name != live.name {
            patch.insert("name".to_string(), json!(self.name));
        }
        if self.tags != live.tags {
            patch.insert("tags".to_string(), json!(self.tags));
        }
        if let Some(backups) = self.backups {
            if backups != live.has_feature("backups") {
                patch.insert("backups".to_string(), json!(backups));
            }
        }
        if let Some(ipv6) = self.ipv6 {
            if ipv6 != live.has_feature("ipv6") {
                patch.insert("ipv6".to_string(), json!(ipv6));
            }
        }
        if let Some(monitoring) = self.monitoring {
            if monitoring != live.has_feature("monitoring") {
                patch.insert("monitoring".to_string(), json!(monitoring));
            }
        }
        Value::Object(patch)
    }

    fn immutable_conflicts(&self, live: &Droplet) -> Vec<&'static str> {
        let mut conflicts = Vec::new();
        if self.region != live.region.slug {
            conflicts.push("region");
        }
        if self.size != live.size_slug {
            conflicts.push("size");
        }
        if self.image != live.image.reference() {
            conflicts.push("image");
        }
        if self.vpc_uuid.is_some() && self.vpc_uuid != live.vpc_uuid {
            conflicts.push("vpc_uuid");
        }
        conflicts
    }

    fn copy_immutable_from(&mut self, live: &Droplet) {
        self.region = live.region.slug.clone();
        self.size = live.size_slug.clone();
        self.image = live.image.reference();
        self.vpc_uuid = live.vpc_uuid.clone();
    }

    fn is_name_conflict(&self, message: &str) -> bool {
        let message = message.to_lowercase();
        message.contains("already exists") || message.contains("already in use")
    }

    async fn find_existing(&self, client: &ApiClient) -> Result<Option<Droplet>> {
        Droplet::find_by_name(client, &self.name).await
    }
}

/// Droplet names are hostnames: alphanumerics, dots and hyphens, neither
/// leading nor trailing punctuation
fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() || name.len() > 255 {
        return Err(Error::validation(format!(
            "droplet name must be 1-255 characters, got {} ({:?})",
            name.len(),
            name
        )));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
    {
        return Err(Error::validation(format!(
            "droplet name may only contain alphanumerics, dots and hyphens: {name:?}"
        )));
    }
    if name.starts_with(['-', '.']) || name.ends_with(['-', '.']) {
        return Err(Error::validation(format!(
            "droplet name must not start or end with a dot or hyphen: {name:?}"
        )));
    }
    Ok(())
}

fn validate_tag(tag: &str) -> Result<()> {
    if tag.is_empty() || tag.len() > 255 {
        return Err(Error::validation(format!(
            "tag must be 1-255 characters: {tag:?}"
        )));
    }
    if !tag
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':'))
    {
        return Err(Error::validation(format!(
            "tag may only contain alphanumerics, dashes, underscores and colons: {tag:?}"
        )));
    }
    Ok(())
}

fn validate_slug(what: &str, slug: &str) -> Result<()> {
    if slug.trim().is_empty() {
        return Err(Error::validation(format!("{what} slug must not be blank")));
    }
    Ok(())
}

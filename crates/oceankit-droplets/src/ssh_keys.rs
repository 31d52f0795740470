//! Account SSH keys

use chrono::{DateTime, Utc};
use oceankit_core::error::{Error, Result};
use oceankit_core::page;
use oceankit_core::transport::ApiClient;
use serde::Deserialize;
use serde_json::json;

oceankit_core::int_id!(SshKeyId);

/// Public key types the API accepts
const KEY_TYPE_PREFIXES: &[&str] = &[
    "ssh-rsa ",
    "ssh-ed25519 ",
    "ecdsa-sha2-nistp256 ",
    "ecdsa-sha2-nistp384 ",
    "ecdsa-sha2-nistp521 ",
];

#[derive(Debug, Clone, Deserialize)]
pub struct SshKey {
    id: SshKeyId,
    fingerprint: String,
    name: String,
    public_key: String,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
}

impl SshKey {
    pub fn id(&self) -> SshKeyId {
        self.id
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn public_key(&self) -> &str {
        &self.public_key
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    pub async fn list(client: &ApiClient) -> Result<Vec<Self>> {
        page::collect_all(client, "/v2/account/keys", "ssh_keys").await
    }

    pub async fn get(client: &ApiClient, id: SshKeyId) -> Result<Self> {
        let node = client
            .get_resource(&format!("/v2/account/keys/{id}"), "ssh_key", "SSH key", &id)
            .await?;
        Ok(serde_json::from_value(node)?)
    }

    /// Fetch by fingerprint instead of numeric id
    pub async fn get_by_fingerprint(client: &ApiClient, fingerprint: &str) -> Result<Self> {
        let node = client
            .get_resource(
                &format!("/v2/account/keys/{fingerprint}"),
                "ssh_key",
                "SSH key",
                &fingerprint,
            )
            .await?;
        Ok(serde_json::from_value(node)?)
    }

    /// Register a public key under the given name
    pub async fn create(client: &ApiClient, name: &str, public_key: &str) -> Result<Self> {
        if name.trim().is_empty() {
            return Err(Error::validation("SSH key name must not be blank"));
        }
        if !KEY_TYPE_PREFIXES.iter().any(|p| public_key.starts_with(p)) {
            let expected: Vec<&str> = KEY_TYPE_PREFIXES.iter().map(|p| p.trim_end()).collect();
            return Err(Error::validation(format!(
                "unrecognized public key type; expected one of {}",
                expected.join(", ")
            )));
        }
        let body = client
            .post(
                "/v2/account/keys",
                json!({"name": name, "public_key": public_key}),
            )
            .await?;
        let node = oceankit_core::json::envelope(body, "ssh_key")?;
        Ok(serde_json::from_value(node)?)
    }

    pub async fn delete(client: &ApiClient, id: SshKeyId) -> Result<()> {
        client.delete(&format!("/v2/account/keys/{id}")).await
    }
}

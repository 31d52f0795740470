//! Database users, owned by their cluster snapshot
//!
//! User identity is the user name; role and password are attributes, not
//! identity.

use crate::cluster::DatabaseId;
use oceankit_core::error::{Error, Result};
use oceankit_core::transport::ApiClient;
use serde::Deserialize;
use serde_json::json;
use std::hash::{Hash, Hasher};

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseUser {
    name: String,
    #[serde(default)]
    role: Option<String>,
    #[serde(default)]
    password: Option<String>,
}

impl DatabaseUser {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn role(&self) -> Option<&str> {
        self.role.as_deref()
    }

    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    /// Add a user to a cluster; the server picks the password
    pub async fn add(client: &ApiClient, cluster: &DatabaseId, name: &str) -> Result<Self> {
        if name.trim().is_empty() {
            return Err(Error::validation("user name must not be blank"));
        }
        let body = client
            .post(
                &format!("/v2/databases/{cluster}/users"),
                json!({"name": name}),
            )
            .await?;
        let node = oceankit_core::json::envelope(body, "user")?;
        Ok(serde_json::from_value(node)?)
    }

    pub async fn remove(client: &ApiClient, cluster: &DatabaseId, name: &str) -> Result<()> {
        client
            .delete(&format!("/v2/databases/{cluster}/users/{name}"))
            .await
    }
}

// Identity is the user name
impl PartialEq for DatabaseUser {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for DatabaseUser {}

impl Hash for DatabaseUser {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

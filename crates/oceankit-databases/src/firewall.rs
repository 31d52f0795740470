//! Inbound firewall rules for database clusters
//!
//! Rules carry no stable server identity the client can rely on, so
//! equality is the full field tuple.

use crate::cluster::DatabaseId;
use oceankit_core::error::{Error, Result};
use oceankit_core::transport::ApiClient;
use serde::{Deserialize, Serialize};
use serde_json::json;

/// What a firewall rule allows access from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleTarget {
    IpAddr,
    Droplet,
    K8s,
    Tag,
    App,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FirewallRule {
    #[serde(rename = "type")]
    target: RuleTarget,
    value: String,
}

impl FirewallRule {
    pub fn new(target: RuleTarget, value: &str) -> Result<Self> {
        if value.trim().is_empty() {
            return Err(Error::validation("firewall rule value must not be blank"));
        }
        Ok(Self {
            target,
            value: value.to_string(),
        })
    }

    pub fn target(&self) -> RuleTarget {
        self.target
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Current inbound rules of a cluster
    pub async fn list(client: &ApiClient, cluster: &DatabaseId) -> Result<Vec<Self>> {
        let body = client
            .get(&format!("/v2/databases/{cluster}/firewall"))
            .await?;
        let rules = oceankit_core::json::envelope(body, "rules")?;
        Ok(serde_json::from_value(rules)?)
    }

    /// Replace the cluster's inbound rules wholesale
    pub async fn replace(
        client: &ApiClient,
        cluster: &DatabaseId,
        rules: &[FirewallRule],
    ) -> Result<()> {
        client
            .put(
                &format!("/v2/databases/{cluster}/firewall"),
                json!({"rules": rules}),
            )
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_is_the_full_tuple() {
        let a = FirewallRule::new(RuleTarget::IpAddr, "192.168.1.1").unwrap();
        let b = FirewallRule::new(RuleTarget::IpAddr, "192.168.1.1").unwrap();
        let c = FirewallRule::new(RuleTarget::Tag, "192.168.1.1").unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn wire_shape_uses_type_for_the_target() {
        let rule = FirewallRule::new(RuleTarget::K8s, "cluster-uuid").unwrap();
        assert_eq!(
            serde_json::to_value(&rule).unwrap(),
            json!({"type": "k8s", "value": "cluster-uuid"})
        );
    }

    #[test]
    fn blank_values_are_rejected() {
        assert!(FirewallRule::new(RuleTarget::Tag, "  ").is_err());
    }
}

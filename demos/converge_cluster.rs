//! Converge an existing Kubernetes cluster toward a desired state
//!
//! Fetches the cluster by name, backfills the creation-only fields into
//! the spec, applies the diff (a no-op when nothing changed) and waits
//! for the cluster to settle.

use oceankit_core::{apply, ApiClient, Applied, ClientConfig};
use oceankit_kubernetes::cluster::Cluster;
use oceankit_kubernetes::spec::ClusterSpec;
use oceankit_core::traits::{Resource, ResourceSpec};
use std::time::Duration;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().init();

    let client = ApiClient::from_config(ClientConfig::from_env()?)?;

    let live = Cluster::find_by_name(&client, "prod-cluster")
        .await?
        .ok_or_else(|| anyhow::anyhow!("no cluster named prod-cluster"))?;

    let mut target = ClusterSpec::new("prod-cluster", live.region(), live.version())?
        .tag("k8s")?
        .tag("managed-by-oceankit")?
        .surge_upgrade(true)
        .auto_upgrade(true);
    target.copy_immutable_from(&live);

    match apply(&client, &live, &target).await? {
        Applied::Unchanged => info!("cluster already matches the desired state"),
        Applied::Updated => {
            info!("update submitted, waiting for the cluster to settle");
            let settled = Cluster::wait_running(&client, live.id(), Duration::from_secs(900)).await?;
            info!(version = settled.version(), "cluster is running");
        }
    }

    Ok(())
}

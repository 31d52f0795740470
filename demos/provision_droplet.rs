//! Provision a droplet idempotently and wait for it to come up
//!
//! Reads the API token from `DIGITALOCEAN_ACCESS_TOKEN`. Running this
//! twice is safe: the second run resolves the name conflict into the
//! existing droplet instead of creating a duplicate.

use oceankit_core::traits::Resource;
use oceankit_core::{ApiClient, ClientConfig, CreateOutcome};
use oceankit_droplets::droplet::{Droplet, DropletSpec};
use std::time::Duration;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().init();

    let client = ApiClient::from_config(ClientConfig::from_env()?)?;

    let spec = DropletSpec::new("demo-web-1", "nyc3", "s-1vcpu-1gb", "ubuntu-22-04-x64")?
        .tag("demo")?
        .monitoring(true);

    let droplet = match spec.create(&client).await? {
        CreateOutcome::Created(droplet) => {
            info!(name = droplet.name(), "created a new droplet");
            droplet
        }
        CreateOutcome::ConflictedWith(existing) => {
            info!(name = existing.name(), "droplet already existed, reusing it");
            existing
        }
    };

    let active = Droplet::wait_active(&client, *droplet.id(), Duration::from_secs(300)).await?;
    info!(
        name = active.name(),
        region = active.region_slug(),
        "droplet is active"
    );

    Ok(())
}

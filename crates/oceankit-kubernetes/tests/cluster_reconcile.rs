//! Cluster reconcile and wait flows against a scripted transport

mod common;

use common::*;
use oceankit_core::reconcile::{apply, Applied};
use oceankit_core::traits::{Resource, ResourceSpec};
use oceankit_core::transport::Method;
use oceankit_core::Error;
use oceankit_kubernetes::cluster::{Cluster, ClusterId, ClusterState};
use oceankit_kubernetes::spec::ClusterSpec;
use serde_json::json;
use std::time::Duration;

fn cluster_body(state: &str, surge_upgrade: bool) -> serde_json::Value {
    json!({
        "id": "bd5f5959-5e1e-4205-a714-a914373942af",
        "name": "prod-cluster",
        "region": "nyc1",
        "version": "1.30.2-do.0",
        "cluster_subnet": "10.244.0.0/16",
        "service_subnet": "10.245.0.0/16",
        "tags": ["k8s"],
        "node_pools": [{
            "id": "cdda885e",
            "name": "worker-pool",
            "size": "s-1vcpu-2gb",
            "count": 3,
        }],
        "maintenance_policy": {"day": "any", "start_time": "00:00"},
        "auto_upgrade": false,
        "surge_upgrade": surge_upgrade,
        "ha": false,
        "status": {"state": state},
        "created_at": "2018-11-15T16:00:11Z",
    })
}

fn desired_spec() -> ClusterSpec {
    ClusterSpec::new("prod-cluster", "nyc1", "1.30.2-do.0")
        .unwrap()
        .tag("k8s")
        .unwrap()
        .surge_upgrade(true)
}

#[tokio::test(start_paused = true)]
async fn reconcile_patches_the_flag_and_waits_for_running() {
    let transport = ScriptedTransport::new();
    // live fetch, PUT, then two status polls
    transport.respond(200, json!({"kubernetes_cluster": cluster_body("running", false)}));
    transport.respond(200, json!({"kubernetes_cluster": cluster_body("upgrading", true)}));
    transport.respond(200, json!({"kubernetes_cluster": cluster_body("upgrading", true)}));
    transport.respond(200, json!({"kubernetes_cluster": cluster_body("running", true)}));
    let client = scripted_client(&transport);

    let id = ClusterId::new("bd5f5959-5e1e-4205-a714-a914373942af").unwrap();
    let live = Cluster::get(&client, &id).await.expect("fetch succeeds");

    let mut target = desired_spec();
    target.copy_immutable_from(&live);

    let outcome = apply(&client, &live, &target).await.expect("apply succeeds");
    assert_eq!(outcome, Applied::Updated);

    let put = &transport.requests()[1];
    assert_eq!(put.method, Method::Put);
    assert!(put.url.ends_with("/v2/kubernetes/clusters/bd5f5959-5e1e-4205-a714-a914373942af"));
    assert_eq!(put.body, Some(json!({"surge_upgrade": true})));

    let settled = Cluster::wait_running(&client, &id, Duration::from_secs(600))
        .await
        .expect("cluster settles");
    assert_eq!(settled.status(), ClusterState::Running);
    assert!(target.matches(&settled), "converged state matches the spec");
}

#[tokio::test]
async fn reconcile_without_copying_immutables_is_refused() {
    let transport = ScriptedTransport::new();
    transport.respond(200, json!({"kubernetes_cluster": cluster_body("running", false)}));
    let client = scripted_client(&transport);

    let id = ClusterId::new("bd5f5959-5e1e-4205-a714-a914373942af").unwrap();
    let live = Cluster::get(&client, &id).await.unwrap();

    // deliberately built for another region and never backfilled
    let target = ClusterSpec::new("prod-cluster", "ams3", "1.30.2-do.0").unwrap();
    let err = apply(&client, &live, &target).await.unwrap_err();
    assert!(matches!(err, Error::ImmutableField { .. }));
    assert_eq!(transport.request_count(), 1, "only the initial fetch");
}

#[tokio::test]
async fn kubeconfig_is_returned_verbatim() {
    let transport = ScriptedTransport::new();
    transport.respond_text(200, "apiVersion: v1\nkind: Config\nclusters: []\n");
    let client = scripted_client(&transport);

    let id = ClusterId::new("bd5f5959-5e1e-4205-a714-a914373942af").unwrap();
    let kubeconfig = Cluster::kubeconfig(&client, &id).await.expect("kubeconfig");
    assert!(kubeconfig.starts_with("apiVersion: v1"));
}

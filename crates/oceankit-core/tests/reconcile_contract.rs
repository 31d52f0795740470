//! Contract: diff-and-patch reconciliation
//!
//! Verifies that `reconcile::apply` is a no-op when live state already
//! matches, patches only the changed fields otherwise, refuses
//! immutable-field mismatches before any I/O, and surfaces a vanished
//! resource as not-found. If this file fails, update semantics are broken.

mod common;

use common::*;
use oceankit_core::error::Error;
use oceankit_core::reconcile::{apply, Applied};
use oceankit_core::traits::ResourceSpec;
use oceankit_core::transport::Method;
use serde_json::json;

fn live_box(tags: &[&str]) -> BoxSnapshot {
    serde_json::from_value(box_body(7, "web-1", "running", "nyc3", tags)).unwrap()
}

#[tokio::test]
async fn matching_state_issues_no_request() {
    let transport = ScriptedTransport::new();
    let client = scripted_client(&transport);

    let live = live_box(&["a", "b"]);
    let spec = BoxSpec::new("web-1", "nyc3").tags(["a", "b"]);

    let outcome = apply(&client, &live, &spec).await.expect("apply succeeds");
    assert_eq!(outcome, Applied::Unchanged);
    assert_eq!(transport.request_count(), 0);
}

#[tokio::test]
async fn tag_change_patches_exactly_the_tags_field() {
    let transport = ScriptedTransport::new();
    transport.respond(
        200,
        json!({"box": box_body(7, "web-1", "running", "nyc3", &["a", "c"])}),
    );
    let client = scripted_client(&transport);

    let live = live_box(&["a", "b"]);
    let spec = BoxSpec::new("web-1", "nyc3").tags(["a", "c"]);

    let outcome = apply(&client, &live, &spec).await.expect("apply succeeds");
    assert_eq!(outcome, Applied::Updated);

    let request = transport.last_request();
    assert_eq!(request.method, Method::Put);
    assert!(request.url.ends_with("/v2/boxes/7"));
    assert_eq!(
        request.body,
        Some(json!({"tags": ["a", "c"]})),
        "patch must carry the changed field and nothing else"
    );
}

#[tokio::test]
async fn immutable_mismatch_is_refused_before_any_io() {
    let transport = ScriptedTransport::new();
    let client = scripted_client(&transport);

    let live = live_box(&[]);
    let spec = BoxSpec::new("web-1", "ams3");

    let err = apply(&client, &live, &spec).await.unwrap_err();
    match err {
        Error::ImmutableField { kind, fields } => {
            assert_eq!(kind, "box");
            assert!(fields.contains("region"));
        }
        other => panic!("expected ImmutableField, got {other:?}"),
    }
    assert_eq!(transport.request_count(), 0);
}

#[tokio::test]
async fn copying_immutable_fields_unblocks_the_apply() {
    let transport = ScriptedTransport::new();
    transport.respond_empty(204);
    let client = scripted_client(&transport);

    let live = live_box(&[]);
    let mut spec = BoxSpec::new("web-1", "ams3").tags(["a"]);
    spec.copy_immutable_from(&live);

    let outcome = apply(&client, &live, &spec).await.expect("apply succeeds");
    assert_eq!(outcome, Applied::Updated);
    assert_eq!(transport.request_count(), 1);
}

#[tokio::test]
async fn vanished_resource_surfaces_as_not_found_with_id() {
    // The resource disappeared between read and write
    let transport = ScriptedTransport::new();
    transport.respond(404, json!({"id": "not_found", "message": "not found"}));
    let client = scripted_client(&transport);

    let live = live_box(&["a"]);
    let spec = BoxSpec::new("web-1", "nyc3").tags(["b"]);

    let err = apply(&client, &live, &spec).await.unwrap_err();
    assert!(matches!(err, Error::NotFound(ref m) if m.contains("box 7")));
}

#[tokio::test]
async fn apply_is_idempotent_after_convergence() {
    // First apply writes; a second apply against the refreshed live state
    // is a no-op, so two applies issue at most one write
    let transport = ScriptedTransport::new();
    transport.respond(
        200,
        json!({"box": box_body(7, "web-1", "running", "nyc3", &["a", "c"])}),
    );
    let client = scripted_client(&transport);

    let spec = BoxSpec::new("web-1", "nyc3").tags(["a", "c"]);

    let before = live_box(&["a", "b"]);
    assert_eq!(apply(&client, &before, &spec).await.unwrap(), Applied::Updated);

    let after = live_box(&["a", "c"]);
    assert_eq!(apply(&client, &after, &spec).await.unwrap(), Applied::Unchanged);

    assert_eq!(transport.request_count(), 1);
}

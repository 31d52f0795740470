//! Contract: closed-client semantics and configuration loading
//!
//! A closed client must fail fast on every operation instead of
//! attempting I/O. Configuration files deserialize with defaults filled
//! in.

mod common;

use common::*;
use oceankit_core::error::Error;
use oceankit_core::ClientConfig;
use serde_json::json;
use std::io::Write;

#[tokio::test]
async fn closed_client_refuses_every_operation() {
    let transport = ScriptedTransport::new();
    let client = scripted_client(&transport);

    assert!(!client.is_closed());
    client.close();
    assert!(client.is_closed());

    let err = client.get("/v2/boxes/7").await.unwrap_err();
    assert!(matches!(err, Error::ClientClosed));
    let err = client.post("/v2/boxes", json!({})).await.unwrap_err();
    assert!(matches!(err, Error::ClientClosed));
    let err = client.delete("/v2/boxes/7").await.unwrap_err();
    assert!(matches!(err, Error::ClientClosed));

    assert_eq!(transport.request_count(), 0, "no I/O after close");
}

#[tokio::test]
async fn close_is_idempotent() {
    let transport = ScriptedTransport::new();
    let client = scripted_client(&transport);
    client.close();
    client.close();
    assert!(client.is_closed());
}

#[test]
fn config_file_round_trips_with_defaults() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    write!(file, r#"{{"api_token": "dop_v1_abc"}}"#).expect("write config");

    let raw = std::fs::read_to_string(file.path()).expect("read config");
    let config: ClientConfig = serde_json::from_str(&raw).expect("parse config");
    config.validate().expect("config is valid");

    assert_eq!(config.base_url, oceankit_core::config::DEFAULT_BASE_URL);
    assert_eq!(config.request_timeout_secs, 30);
}

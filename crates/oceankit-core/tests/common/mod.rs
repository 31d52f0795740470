//! Test doubles and common utilities for the engine contract tests
//!
//! `ScriptedTransport` plays back a queue of canned responses and records
//! every request it sees. `BoxSnapshot`/`BoxSpec` are a minimal fake
//! resource kind ("box") exercising the same trait surface the real
//! resource crates implement.

use async_trait::async_trait;
use oceankit_core::error::{Error, Result};
use oceankit_core::page;
use oceankit_core::traits::{Resource, ResourceSpec};
use oceankit_core::transport::{ApiClient, ApiRequest, ApiResponse, Transport};
use oceankit_core::ClientConfig;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::{BTreeSet, VecDeque};
use std::sync::{Arc, Mutex};

oceankit_core::int_id!(BoxId);

/// Transport double playing back canned responses in order
///
/// Clones share the same script and request log, so a test can keep a
/// handle after moving a clone into the client.
#[derive(Clone, Default)]
pub struct ScriptedTransport {
    responses: Arc<Mutex<VecDeque<Result<ApiResponse>>>>,
    requests: Arc<Mutex<Vec<ApiRequest>>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a JSON response
    pub fn respond(&self, status: u16, body: Value) {
        self.responses.lock().unwrap().push_back(Ok(ApiResponse {
            status,
            body: body.to_string(),
        }));
    }

    /// Queue an empty-body response (e.g. a 204)
    pub fn respond_empty(&self, status: u16) {
        self.responses.lock().unwrap().push_back(Ok(ApiResponse {
            status,
            body: String::new(),
        }));
    }

    /// Queue a transport-level failure
    pub fn fail(&self, err: Error) {
        self.responses.lock().unwrap().push_back(Err(err));
    }

    /// Number of requests that reached the transport
    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> ApiRequest {
        self.requests
            .lock()
            .unwrap()
            .last()
            .expect("no request was issued")
            .clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .expect("transport script exhausted")
    }
}

/// Client wired to a scripted transport
pub fn scripted_client(transport: &ScriptedTransport) -> ApiClient {
    ApiClient::with_transport(
        ClientConfig::new("test-token"),
        Box::new(transport.clone()),
    )
    .expect("client construction succeeds")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoxStatus {
    Provisioning,
    Running,
    Off,
}

/// Fake resource snapshot used by the contract tests
#[derive(Debug, Clone, Deserialize)]
pub struct BoxSnapshot {
    pub id: BoxId,
    pub name: String,
    pub status: BoxStatus,
    pub region: String,
    pub tags: BTreeSet<String>,
}

#[async_trait]
impl Resource for BoxSnapshot {
    type Id = BoxId;
    type Status = BoxStatus;

    fn kind() -> &'static str {
        "box"
    }

    fn id(&self) -> &BoxId {
        &self.id
    }

    fn status(&self) -> BoxStatus {
        self.status
    }

    async fn fetch(client: &ApiClient, id: &BoxId) -> Result<Self> {
        let node = client
            .get_resource(&format!("/v2/boxes/{id}"), "box", "box", id)
            .await?;
        Ok(serde_json::from_value(node)?)
    }
}

/// Fake desired-state builder for the "box" resource kind
#[derive(Debug, Clone)]
pub struct BoxSpec {
    pub name: String,
    pub region: String,
    pub tags: BTreeSet<String>,
}

impl BoxSpec {
    pub fn new(name: &str, region: &str) -> Self {
        Self {
            name: name.to_string(),
            region: region.to_string(),
            tags: BTreeSet::new(),
        }
    }

    pub fn tags<I: IntoIterator<Item = &'static str>>(mut self, tags: I) -> Self {
        self.tags = tags.into_iter().map(ToString::to_string).collect();
        self
    }
}

#[async_trait]
impl ResourceSpec for BoxSpec {
    type Snapshot = BoxSnapshot;

    fn display_name(&self) -> &str {
        &self.name
    }

    fn create_uri(&self) -> String {
        "/v2/boxes".to_string()
    }

    fn update_uri(&self, id: &BoxId) -> String {
        format!("/v2/boxes/{id}")
    }

    fn envelope() -> &'static str {
        "box"
    }

    fn create_body(&self) -> Value {
        json!({
            "name": self.name,
            "region": self.region,
            "tags": self.tags,
        })
    }

    fn matches(&self, live: &BoxSnapshot) -> bool {
        self.name == live.name && self.tags == live.tags
    }

    fn update_body(&self, live: &BoxSnapshot) -> Value {
        let mut patch = serde_json::Map::new();
        if self.name != live.name {
            patch.insert("name".to_string(), json!(self.name));
        }
        if self.tags != live.tags {
            patch.insert("tags".to_string(), json!(self.tags));
        }
        Value::Object(patch)
    }

    fn immutable_conflicts(&self, live: &BoxSnapshot) -> Vec<&'static str> {
        if self.region != live.region {
            vec!["region"]
        } else {
            Vec::new()
        }
    }

    fn copy_immutable_from(&mut self, live: &BoxSnapshot) {
        self.region = live.region.clone();
    }

    fn is_name_conflict(&self, message: &str) -> bool {
        message.to_lowercase().contains("already exists")
    }

    async fn find_existing(&self, client: &ApiClient) -> Result<Option<BoxSnapshot>> {
        page::find_first(client, "/v2/boxes", "boxes", |b: &BoxSnapshot| {
            b.name == self.name
        })
        .await
    }
}

/// A canned box body as the server would render it
pub fn box_body(id: u64, name: &str, status: &str, region: &str, tags: &[&str]) -> Value {
    json!({
        "id": id,
        "name": name,
        "status": status,
        "region": region,
        "tags": tags,
    })
}

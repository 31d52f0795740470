//! Scripted transport double for cluster reconcile tests

use async_trait::async_trait;
use oceankit_core::error::Result;
use oceankit_core::transport::{ApiClient, ApiRequest, ApiResponse, Transport};
use oceankit_core::ClientConfig;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

#[derive(Clone, Default)]
pub struct ScriptedTransport {
    responses: Arc<Mutex<VecDeque<ApiResponse>>>,
    requests: Arc<Mutex<Vec<ApiRequest>>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, status: u16, body: Value) {
        self.responses.lock().unwrap().push_back(ApiResponse {
            status,
            body: body.to_string(),
        });
    }

    pub fn respond_text(&self, status: u16, body: &str) {
        self.responses.lock().unwrap().push_back(ApiResponse {
            status,
            body: body.to_string(),
        });
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse> {
        self.requests.lock().unwrap().push(request);
        Ok(self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .expect("transport script exhausted"))
    }
}

pub fn scripted_client(transport: &ScriptedTransport) -> ApiClient {
    ApiClient::with_transport(
        ClientConfig::new("test-token"),
        Box::new(transport.clone()),
    )
    .expect("client construction succeeds")
}

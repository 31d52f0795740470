//! HTTP transport adapter
//!
//! [`ApiClient`] builds authenticated requests, hands them to a
//! [`Transport`] implementation for the actual I/O, decodes JSON bodies and
//! translates non-2xx statuses into typed errors. The concrete
//! [`HttpTransport`](http::HttpTransport) lives behind the trait so tests
//! can script responses without a network.
//!
//! This layer never retries. Transient transport failures surface to the
//! caller unmodified; retry belongs to the poll loop and is scoped to
//! waiting for state, not to recovering from outages.
//!
//! ## Status code contract
//!
//! - 2xx: decoded JSON body (or `Null` for empty bodies)
//! - 404: [`Error::NotFound`]
//! - 401/403: [`Error::AccessDenied`] with the server message
//! - 422: [`Error::Unprocessable`] with the server message
//! - anything else: [`Error::Protocol`]; the client refuses to guess

pub mod http;

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

pub use http::HttpTransport;

/// HTTP method of an [`ApiRequest`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

/// A fully prepared request: absolute URL, headers and optional JSON body
///
/// Built by [`ApiClient`]; the authorization and content-type headers are
/// already populated when a transport sees it.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(&'static str, String)>,
    pub body: Option<Value>,
}

/// Raw response handed back by a [`Transport`]
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

/// Performs the I/O for one request
///
/// Implementations are single-shot: one HTTP exchange per call, no retry,
/// no backoff, no caching. Failures are reported as errors and the caller
/// decides what to do with them.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse>;
}

/// Authenticated API client
///
/// Owns the transport, the endpoint and the bearer token. All typed
/// resource operations in the satellite crates go through this type.
///
/// Once [`close`](ApiClient::close)d, every subsequent operation fails fast
/// with [`Error::ClientClosed`] instead of attempting I/O.
///
/// # Security
///
/// The Debug implementation intentionally does NOT expose the API token.
pub struct ApiClient {
    transport: Box<dyn Transport>,
    base_url: String,
    api_token: String,
    closed: AtomicBool,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("api_token", &"<REDACTED>")
            .field("base_url", &self.base_url)
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl ApiClient {
    /// Create a client for the default endpoint
    pub fn new(api_token: impl Into<String>) -> Result<Self> {
        Self::from_config(ClientConfig::new(api_token))
    }

    /// Create a client from a full configuration
    pub fn from_config(config: ClientConfig) -> Result<Self> {
        let timeout = std::time::Duration::from_secs(config.request_timeout_secs);
        let transport = HttpTransport::new(timeout)?;
        Self::with_transport(config, Box::new(transport))
    }

    /// Create a client over a caller-supplied transport
    ///
    /// This is the seam used by tests and by embedders that bring their own
    /// HTTP stack.
    pub fn with_transport(config: ClientConfig, transport: Box<dyn Transport>) -> Result<Self> {
        config.validate()?;
        let base_url = config.base_url.trim_end_matches('/').to_string();
        Ok(Self {
            transport,
            base_url,
            api_token: config.api_token,
            closed: AtomicBool::new(false),
        })
    }

    /// Mark the client closed; all further operations fail fast
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn ensure_open(&self) -> Result<()> {
        if self.is_closed() {
            return Err(Error::ClientClosed);
        }
        Ok(())
    }

    /// Resolve a path against the base URL; absolute URLs (pagination next
    /// links) pass through untouched
    fn absolute(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            format!("{}{}", self.base_url, path)
        }
    }

    fn request(&self, method: Method, path: &str, body: Option<Value>) -> ApiRequest {
        ApiRequest {
            method,
            url: self.absolute(path),
            headers: vec![
                ("Authorization", format!("Bearer {}", self.api_token)),
                ("Content-Type", "application/json".to_string()),
            ],
            body,
        }
    }

    async fn send(&self, method: Method, path: &str, body: Option<Value>) -> Result<ApiResponse> {
        self.ensure_open()?;
        debug!(method = method.as_str(), path, "sending API request");
        let response = self.transport.execute(self.request(method, path, body)).await?;
        check_status(response)
    }

    /// GET a JSON document
    pub async fn get(&self, path: &str) -> Result<Value> {
        let response = self.send(Method::Get, path, None).await?;
        decode_body(&response)
    }

    /// GET a raw text document (e.g. a kubeconfig)
    pub async fn get_text(&self, path: &str) -> Result<String> {
        let response = self.send(Method::Get, path, None).await?;
        Ok(response.body)
    }

    /// POST a JSON body and decode the response
    pub async fn post(&self, path: &str, body: Value) -> Result<Value> {
        let response = self.send(Method::Post, path, Some(body)).await?;
        decode_body(&response)
    }

    /// PUT a JSON body and decode the response
    pub async fn put(&self, path: &str, body: Value) -> Result<Value> {
        let response = self.send(Method::Put, path, Some(body)).await?;
        decode_body(&response)
    }

    /// DELETE; any 2xx counts as success
    pub async fn delete(&self, path: &str) -> Result<()> {
        self.send(Method::Delete, path, None).await?;
        Ok(())
    }

    /// GET one resource, unwrap its envelope field and rewrite a bare 404
    /// into a not-found error naming the resource
    pub async fn get_resource(
        &self,
        path: &str,
        envelope: &str,
        kind: &str,
        id: &(dyn fmt::Display + Sync),
    ) -> Result<Value> {
        match self.get(path).await {
            Ok(body) => crate::json::envelope(body, envelope),
            Err(Error::NotFound(_)) => Err(Error::not_found(format!("{kind} {id}"))),
            Err(e) => Err(e),
        }
    }
}

/// Extract the server-provided `message` field from an error body, if any
fn server_message(response: &ApiResponse) -> Option<String> {
    let value: Value = serde_json::from_str(&response.body).ok()?;
    value.get("message")?.as_str().map(ToString::to_string)
}

fn check_status(response: ApiResponse) -> Result<ApiResponse> {
    let status = response.status;
    if (200..300).contains(&status) {
        return Ok(response);
    }
    let message = server_message(&response);
    match status {
        404 => Err(Error::not_found(
            message.unwrap_or_else(|| "resource not found".to_string()),
        )),
        401 | 403 => Err(Error::access_denied(message.unwrap_or_else(|| {
            format!("authentication failed with status {status}")
        }))),
        422 => Err(Error::unprocessable(
            message.unwrap_or_else(|| response.body.clone()),
        )),
        _ => {
            let detail: String = response.body.chars().take(512).collect();
            Err(Error::protocol(format!(
                "unexpected status {status}: {detail}"
            )))
        }
    }
}

fn decode_body(response: &ApiResponse) -> Result<Value> {
    if response.body.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(&response.body).map_err(Error::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16, body: &str) -> ApiResponse {
        ApiResponse {
            status,
            body: body.to_string(),
        }
    }

    #[test]
    fn success_statuses_pass_through() {
        for status in [200, 201, 202, 204] {
            assert!(check_status(response(status, "{}")).is_ok());
        }
    }

    #[test]
    fn not_found_maps_to_typed_error() {
        let err = check_status(response(404, r#"{"id":"not_found","message":"no such droplet"}"#))
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(ref m) if m == "no such droplet"));
    }

    #[test]
    fn auth_failures_map_to_access_denied() {
        for status in [401, 403] {
            let err = check_status(response(status, r#"{"message":"Unable to authenticate"}"#))
                .unwrap_err();
            assert!(matches!(err, Error::AccessDenied(_)));
        }
    }

    #[test]
    fn unprocessable_carries_server_message() {
        let err = check_status(response(
            422,
            r#"{"id":"unprocessable_entity","message":"a cluster with this name already exists"}"#,
        ))
        .unwrap_err();
        assert!(
            matches!(err, Error::Unprocessable(ref m) if m.contains("already exists"))
        );
    }

    #[test]
    fn unexpected_status_is_a_protocol_violation() {
        let err = check_status(response(500, "oops")).unwrap_err();
        assert!(matches!(err, Error::Protocol(_)));
        let err = check_status(response(302, "")).unwrap_err();
        assert!(matches!(err, Error::Protocol(_)));
    }

    #[test]
    fn empty_body_decodes_to_null() {
        assert_eq!(decode_body(&response(204, "")).unwrap(), Value::Null);
    }

    #[test]
    fn malformed_body_is_a_json_error() {
        let err = decode_body(&response(200, "{not json")).unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }
}

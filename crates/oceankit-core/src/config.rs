//! Client configuration
//!
//! This module defines the configuration consumed by
//! [`ApiClient`](crate::transport::ApiClient).

use serde::{Deserialize, Serialize};

/// Default API endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.digitalocean.com";

/// Environment variable checked first by [`ClientConfig::from_env`]
pub const TOKEN_ENV: &str = "DIGITALOCEAN_ACCESS_TOKEN";

/// Fallback environment variable checked by [`ClientConfig::from_env`]
pub const TOKEN_ENV_FALLBACK: &str = "DIGITALOCEAN_TOKEN";

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

/// Client configuration
///
/// # Security
///
/// The Debug implementation intentionally does NOT expose the API token.
#[derive(Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Bearer token sent in the `Authorization` header
    pub api_token: String,

    /// API endpoint; overridable for mock servers
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_token", &"<REDACTED>")
            .field("base_url", &self.base_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

impl ClientConfig {
    /// Create a configuration with default endpoint and timeout
    pub fn new(api_token: impl Into<String>) -> Self {
        Self {
            api_token: api_token.into(),
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }

    /// Read the API token from the environment
    ///
    /// Checks `DIGITALOCEAN_ACCESS_TOKEN` first, then `DIGITALOCEAN_TOKEN`.
    pub fn from_env() -> Result<Self, crate::Error> {
        let token = std::env::var(TOKEN_ENV)
            .or_else(|_| std::env::var(TOKEN_ENV_FALLBACK))
            .map_err(|_| {
                crate::Error::config(format!(
                    "neither {TOKEN_ENV} nor {TOKEN_ENV_FALLBACK} is set"
                ))
            })?;
        let config = Self::new(token);
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.api_token.trim().is_empty() {
            return Err(crate::Error::config("API token cannot be empty"));
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(crate::Error::config(format!(
                "base URL must be http(s): {}",
                self.base_url
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(crate::Error::config("request timeout must be > 0"));
        }
        Ok(())
    }
}

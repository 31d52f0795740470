//! Error types for the oceankit client
//!
//! This module defines all error types used throughout the workspace.

use std::time::Duration;
use thiserror::Error;

/// Result type alias for oceankit operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the oceankit client
///
/// The taxonomy distinguishes caller mistakes (`Validation`,
/// `ImmutableField`), expected server answers (`NotFound`, `AccessDenied`,
/// `Unprocessable`), transient transport failures (`Transport`, `Network`,
/// never retried by this library) and contract breakage (`Protocol`).
///
/// A create-time name collision is NOT an error; it is the
/// [`CreateOutcome::ConflictedWith`](crate::reconcile::CreateOutcome)
/// variant, because it is an expected outcome of idempotent creates.
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid input handed to a builder or constructor; raised locally,
    /// never sent over the wire
    #[error("invalid input: {0}")]
    Validation(String),

    /// The server no longer recognizes the targeted resource
    #[error("not found: {0}")]
    NotFound(String),

    /// 401/403-class response
    #[error("access denied: {0}")]
    AccessDenied(String),

    /// 422 response; the message is pattern-matched for known conflict
    /// phrases during create
    #[error("unprocessable request: {0}")]
    Unprocessable(String),

    /// A desired-state object disagrees with the live snapshot on fields
    /// the server fixes at creation time
    #[error("{kind} has creation-only fields that differ from the live resource: {fields}")]
    ImmutableField {
        /// Resource kind name
        kind: &'static str,
        /// Comma-separated list of mismatched fields
        fields: String,
    },

    /// A wait loop exhausted its budget before the target state was reached
    #[error("timed out after {budget:?} waiting for the target state")]
    WaitTimeout {
        /// The caller-supplied timeout budget
        budget: Duration,
    },

    /// The client was closed; no further I/O is attempted
    #[error("client is closed")]
    ClientClosed,

    /// HTTP-level failure (connect, TLS, request timeout)
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Network-related errors
    #[error("network error: {0}")]
    Network(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// Unexpected status code or response shape. Indicates a server
    /// contract change or a library bug; deliberately never downgraded
    #[error("protocol violation: {0}")]
    Protocol(String),
}

impl Error {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a "not found" error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create an access-denied error
    pub fn access_denied(msg: impl Into<String>) -> Self {
        Self::AccessDenied(msg.into())
    }

    /// Create an unprocessable-request error
    pub fn unprocessable(msg: impl Into<String>) -> Self {
        Self::Unprocessable(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a protocol-violation error
    pub fn protocol(msg: impl Into<String>) -> Self {
        Self::Protocol(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_carries_context() {
        let err = Error::not_found("droplet 42");
        assert_eq!(err.to_string(), "not found: droplet 42");

        let err = Error::ImmutableField {
            kind: "kubernetes cluster",
            fields: "region, version".to_string(),
        };
        assert!(err.to_string().contains("region, version"));

        let err = Error::WaitTimeout {
            budget: Duration::from_secs(90),
        };
        assert!(err.to_string().contains("90s"));
    }
}

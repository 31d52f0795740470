//! The live-snapshot side of the reconciliation protocol

use crate::error::Result;
use crate::transport::ApiClient;
use async_trait::async_trait;
use std::fmt;

/// A server-side resource observable as immutable snapshots
///
/// Implementors are plain value objects parsed from a response body. A
/// snapshot never mutates in place; the only way to observe newer state is
/// [`reload`](Resource::reload), which fetches a brand-new snapshot.
///
/// # Thread safety
///
/// Snapshots are immutable and freely shareable. The client is passed
/// explicitly at each call site rather than captured inside the snapshot.
#[async_trait]
pub trait Resource: Sized + Send + Sync {
    /// Typed identifier for this resource kind
    type Id: fmt::Display + Send + Sync;

    /// Status the poll loop compares against its target
    type Status: PartialEq + fmt::Debug + Send;

    /// Resource kind name used in errors and logs (e.g. "droplet")
    fn kind() -> &'static str;

    fn id(&self) -> &Self::Id;

    fn status(&self) -> Self::Status;

    /// Fetch a fresh snapshot by identifier
    ///
    /// A missing resource surfaces as [`Error::NotFound`](crate::Error)
    /// carrying the kind and identifier.
    async fn fetch(client: &ApiClient, id: &Self::Id) -> Result<Self>;

    /// Re-fetch this resource and return a new snapshot; `self` is left
    /// untouched
    async fn reload(&self, client: &ApiClient) -> Result<Self> {
        Self::fetch(client, self.id()).await
    }
}

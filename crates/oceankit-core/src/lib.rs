//! # oceankit-core
//!
//! Core of the oceankit client for the DigitalOcean v2 API.
//!
//! Every resource kind managed by the satellite crates (droplets,
//! Kubernetes clusters, database clusters, container registries) follows
//! the same protocol, implemented exactly once here:
//!
//! - **[`transport`]**: authenticated requests, JSON decoding, typed error
//!   translation, fail-fast once closed
//! - **[`page`]**: paginated listing with aggregation or short-circuit
//! - **[`traits`]**: the [`Resource`]/[`ResourceSpec`] seam each resource
//!   kind adapts to
//! - **[`reconcile`]**: idempotent create with conflict detection, and
//!   diff-and-patch updates
//! - **[`poll`]**: wait-for-state with capped exponential backoff
//!
//! ## Design principles
//!
//! 1. **One engine, many adapters**: the create/diff/wait control flow is
//!    never copy-pasted per resource
//! 2. **Snapshots are immutable**: newer state is only observable by
//!    fetching a new snapshot
//! 3. **No hidden retries**: transport failures propagate; only
//!    state-convergence polling loops
//! 4. **Typed surprise**: unexpected statuses are protocol violations, not
//!    silently absorbed conditions

pub mod config;
pub mod error;
pub mod ids;
pub mod json;
pub mod page;
pub mod poll;
pub mod reconcile;
pub mod schedule;
pub mod traits;
pub mod transport;

// Re-export core types for convenience
pub use config::ClientConfig;
pub use error::{Error, Result};
pub use poll::{wait_for, wait_until_gone, Backoff};
pub use reconcile::{apply, create, Applied, CreateOutcome};
pub use schedule::MaintenanceWindow;
pub use traits::{Resource, ResourceSpec};
pub use transport::{ApiClient, ApiRequest, ApiResponse, HttpTransport, Method, Transport};

//! Reconciliation engine
//!
//! One implementation of the create-or-conflict and diff-and-patch
//! protocol, shared by every resource kind through the
//! [`ResourceSpec`](crate::traits::ResourceSpec) seam.
//!
//! ## Flow
//!
//! 1. [`create`] submits a desired-state spec. A 422 whose message matches
//!    the spec's conflict phrases is resolved into the already-existing
//!    resource; every other failure propagates.
//! 2. [`apply`] converges a live snapshot toward a spec: no-op when they
//!    already match, otherwise one PUT carrying only the changed fields.
//! 3. The caller polls with [`wait_for`](crate::poll::wait_for) until the
//!    resource settles.

use crate::error::{Error, Result};
use crate::json;
use crate::traits::{Resource, ResourceSpec};
use crate::transport::ApiClient;
use tracing::{debug, info};

/// Result of an idempotent create
///
/// Exactly one variant is populated. A conflict is an expected outcome of
/// idempotent-create semantics, not an error: the server refused the name,
/// and the existing holder of that name is returned instead.
#[derive(Debug)]
pub enum CreateOutcome<S> {
    /// The server created a new resource
    Created(S),
    /// An existing resource already holds the requested name
    ConflictedWith(S),
}

impl<S> CreateOutcome<S> {
    /// The snapshot, regardless of which variant carried it
    pub fn into_snapshot(self) -> S {
        match self {
            CreateOutcome::Created(s) | CreateOutcome::ConflictedWith(s) => s,
        }
    }

    pub fn was_created(&self) -> bool {
        matches!(self, CreateOutcome::Created(_))
    }
}

/// Result of [`apply`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// Live state already matched the spec; no request was issued
    Unchanged,
    /// One partial update was submitted
    Updated,
}

/// Submit a desired-state spec, detecting name conflicts
///
/// A 2xx yields [`CreateOutcome::Created`]. A 422 whose message matches
/// [`ResourceSpec::is_name_conflict`] triggers a lookup by name and yields
/// [`CreateOutcome::ConflictedWith`]; if that lookup comes up empty the
/// server contradicted itself and the call fails with
/// [`Error::Protocol`]. Any other non-success status propagates untouched.
pub async fn create<S: ResourceSpec>(
    client: &ApiClient,
    spec: &S,
) -> Result<CreateOutcome<S::Snapshot>> {
    let kind = <S::Snapshot as Resource>::kind();
    match client.post(&spec.create_uri(), spec.create_body()).await {
        Ok(body) => {
            let node = json::envelope(body, S::envelope())?;
            let snapshot = serde_json::from_value(node)?;
            info!(kind, name = spec.display_name(), "created resource");
            Ok(CreateOutcome::Created(snapshot))
        }
        Err(Error::Unprocessable(message)) if spec.is_name_conflict(&message) => {
            debug!(
                kind,
                name = spec.display_name(),
                %message,
                "create rejected as a name conflict; looking up the existing resource"
            );
            match spec.find_existing(client).await? {
                Some(existing) => Ok(CreateOutcome::ConflictedWith(existing)),
                None => Err(Error::protocol(format!(
                    "server reported a name conflict creating {} {:?} \
                     but no resource with that name is visible",
                    kind,
                    spec.display_name()
                ))),
            }
        }
        Err(e) => Err(e),
    }
}

/// Converge a live snapshot toward a desired-state spec
///
/// Creation-only fields must already agree; call
/// [`ResourceSpec::copy_immutable_from`] first. A mismatch there is a
/// caller bug and fails with [`Error::ImmutableField`] before any network
/// traffic. When live state already [`matches`](ResourceSpec::matches) the
/// spec, this is a no-op with zero network calls, which makes repeated
/// applies idempotent.
///
/// No optimistic concurrency: there is no version or ETag check, so of two
/// concurrent writers the last one observed by the server wins.
///
/// A 404 on the update means the resource disappeared between read and
/// write and surfaces as [`Error::NotFound`] carrying the identifier.
pub async fn apply<S: ResourceSpec>(
    client: &ApiClient,
    live: &S::Snapshot,
    target: &S,
) -> Result<Applied> {
    let kind = <S::Snapshot as Resource>::kind();
    let conflicts = target.immutable_conflicts(live);
    if !conflicts.is_empty() {
        return Err(Error::ImmutableField {
            kind,
            fields: conflicts.join(", "),
        });
    }
    if target.matches(live) {
        debug!(kind, id = %live.id(), "live state already matches the spec");
        return Ok(Applied::Unchanged);
    }
    let patch = target.update_body(live);
    debug!(kind, id = %live.id(), %patch, "submitting partial update");
    match client.put(&target.update_uri(live.id()), patch).await {
        Ok(_) => {
            info!(kind, id = %live.id(), "updated resource");
            Ok(Applied::Updated)
        }
        Err(Error::NotFound(_)) => {
            Err(Error::not_found(format!("{kind} {}", live.id())))
        }
        Err(e) => Err(e),
    }
}

//! The desired-state side of the reconciliation protocol

use crate::error::Result;
use crate::traits::resource::Resource;
use crate::transport::ApiClient;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// A mutable desired-state builder for one resource kind
///
/// Builders accumulate the fields a caller wants a resource to have.
/// Setters validate immediately; a builder never holds invalid data.
/// Submission and diffing go through the engine functions in
/// [`reconcile`](crate::reconcile), which drive these hooks:
///
/// - [`create_body`](ResourceSpec::create_body) and
///   [`create_uri`](ResourceSpec::create_uri) for the initial POST
/// - [`matches`](ResourceSpec::matches) as the "nothing to do" fast path
/// - [`update_body`](ResourceSpec::update_body) to build the partial patch
/// - [`immutable_conflicts`](ResourceSpec::immutable_conflicts) to refuse
///   updates that disagree on creation-only fields
/// - [`is_name_conflict`](ResourceSpec::is_name_conflict) and
///   [`find_existing`](ResourceSpec::find_existing) for idempotent-create
///   conflict detection
#[async_trait]
pub trait ResourceSpec: Send + Sync {
    /// Snapshot type this spec converges toward
    type Snapshot: Resource + DeserializeOwned;

    /// The name under which the resource is created; used for conflict
    /// lookup and logging
    fn display_name(&self) -> &str;

    /// POST endpoint for creation
    fn create_uri(&self) -> String;

    /// PUT endpoint for the partial update of one resource
    fn update_uri(&self, id: &<Self::Snapshot as Resource>::Id) -> String;

    /// Envelope field wrapping a single resource in response bodies
    fn envelope() -> &'static str;

    /// Full creation body
    fn create_body(&self) -> Value;

    /// Field-by-field structural comparison against a live snapshot,
    /// covering exactly the fields an update could change. No side effects
    fn matches(&self, live: &Self::Snapshot) -> bool;

    /// Partial update body containing only the fields that differ from
    /// `live`; never creation-only fields
    fn update_body(&self, live: &Self::Snapshot) -> Value;

    /// Names of creation-only fields on which this spec disagrees with the
    /// live snapshot. Non-empty means the caller forgot
    /// [`copy_immutable_from`](ResourceSpec::copy_immutable_from)
    fn immutable_conflicts(&self, live: &Self::Snapshot) -> Vec<&'static str>;

    /// Backfill creation-only fields from a live snapshot so the spec can
    /// be diffed against it
    fn copy_immutable_from(&mut self, live: &Self::Snapshot);

    /// Whether a 422 message indicates a name collision with an existing
    /// resource. Pattern-matching server wording is brittle by nature, so
    /// each resource kind owns its phrase list
    fn is_name_conflict(&self, message: &str) -> bool;

    /// Best-effort lookup of the resource this spec collided with
    async fn find_existing(&self, client: &ApiClient) -> Result<Option<Self::Snapshot>>;
}

//! # oceankit-registry
//!
//! Container registry resources for the oceankit client: the account's
//! [`Registry`], its repositories and tags, and garbage collection as a
//! pollable asynchronous operation.

pub mod garbage_collection;
pub mod registry;
pub mod repository;

pub use garbage_collection::{GarbageCollection, GcStatus};
pub use registry::{Registry, RegistryName, RegistrySpec};
pub use repository::{Repository, RepositoryTag};

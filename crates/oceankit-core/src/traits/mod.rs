//! Trait seams implemented by the per-resource crates
//!
//! The reconciliation engine and the poll loop are written once, against
//! these traits. Each resource crate (droplets, kubernetes, databases,
//! registry) supplies a small adapter instead of re-implementing the
//! create/diff/wait protocol.

pub mod resource;
pub mod spec;

pub use resource::Resource;
pub use spec::ResourceSpec;

//! # oceankit-droplets
//!
//! Droplet resources for the oceankit client, plus the account-level
//! resources droplet provisioning leans on: SSH keys, VPCs, regions,
//! sizes and projects.
//!
//! The create/diff/wait protocol itself lives in `oceankit-core`; this
//! crate supplies the [`Droplet`] snapshot, the validating
//! [`DropletSpec`] builder and the endpoint plumbing.

pub mod droplet;
pub mod projects;
pub mod regions;
pub mod ssh_keys;
pub mod vpcs;

pub use droplet::{Droplet, DropletId, DropletSpec, DropletStatus};
pub use projects::{Project, ProjectId};
pub use regions::{Region, Size};
pub use ssh_keys::{SshKey, SshKeyId};
pub use vpcs::{Vpc, VpcId};

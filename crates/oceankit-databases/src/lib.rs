//! # oceankit-databases
//!
//! Managed database cluster resources for the oceankit client: the
//! [`DatabaseCluster`] snapshot, the validating [`DatabaseSpec`] builder,
//! users and firewall rules.
//!
//! Unlike most resources the database API routes mutations through
//! dedicated endpoints: the generic diff covers the maintenance window
//! (`PUT .../maintenance`), while node count and size changes are explicit
//! [`DatabaseCluster::resize`] calls.

pub mod cluster;
pub mod firewall;
pub mod spec;
pub mod users;

pub use cluster::{DatabaseCluster, DatabaseEngine, DatabaseId, DatabaseStatus};
pub use firewall::{FirewallRule, RuleTarget};
pub use spec::DatabaseSpec;
pub use users::DatabaseUser;

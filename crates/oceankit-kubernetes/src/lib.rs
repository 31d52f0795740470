//! # oceankit-kubernetes
//!
//! Managed Kubernetes (DOKS) cluster resources for the oceankit client:
//! the [`Cluster`] snapshot, the validating [`ClusterSpec`] builder, node
//! pools, kubeconfig retrieval and the destroy-with-associated-resources
//! escape hatch.
//!
//! Create/diff/wait all go through the shared engine in `oceankit-core`.

pub mod cluster;
pub mod node_pool;
pub mod spec;

pub use cluster::{Cluster, ClusterId, ClusterState, MaintenancePolicy};
pub use node_pool::{NodePool, NodePoolId, NodePoolSpec, Taint};
pub use spec::ClusterSpec;

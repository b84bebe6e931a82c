//! Propagation forest reconstruction from parent references.
//!
//! Raw parent references may form cycles or point at posts that have not
//! arrived yet. The builder never fails on either: cycle members and orphans
//! become roots, and the problems are listed in a [`BuildReport`].

pub mod builder;
pub mod forest;
pub mod invariants;

pub use builder::build_forest;
pub use forest::{BuildReport, Forest, NodeIndex, NodeStatus, TreeNode};

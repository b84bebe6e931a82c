//! Mutrace Core - in-memory analysis kernel for rumor propagation
//!
//! This crate provides the deterministic building blocks of the viewer:
//! - Post and incident models mirroring the backend wire shapes
//! - Character-level diff engine and mutation scoring
//! - Propagation forest construction with orphan and cycle isolation
//! - Tidy-tree layout for rendering the forest
//! - Pure snapshot/live-event merge state machine
//!
//! Nothing here performs I/O; the async session layer lives in `mutrace-engine`.

pub use mutrace_core_types as types;

pub mod analysis;
pub mod config;
pub mod diff;
pub mod errors;
pub mod hierarchy;
pub mod layout;
pub mod logging_facility;
pub mod merge;
pub mod model;
pub mod scoring;

// Re-export commonly used types
pub use analysis::{analyze_post, PostAnalysis};
pub use config::EngineConfig;
pub use diff::{compute_diff, DiffOpcode, OpTag};
pub use errors::{ExError, ExErrorKind, MutraceError, Result};
pub use hierarchy::{build_forest, BuildReport, Forest, NodeStatus, TreeNode};
pub use layout::{assign_layout, Layout, Position};
pub use merge::{apply, MergeEvent, MergeOutcome, MergeState, PostSet};
pub use model::{Incident, MutationType, Post, Severity};
pub use scoring::{MutationAssessment, MutationScorer};

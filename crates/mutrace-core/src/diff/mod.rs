//! Character-level edit transcripts between a post and its parent.
//!
//! ## Entry point
//!
//! ```
//! use mutrace_core::diff::{compute_diff, OpTag};
//!
//! let ops = compute_diff("The sky is blue", "The sky is red");
//! assert_eq!(ops[0].tag, OpTag::Equal);
//! ```
//!
//! ## Guarantees
//!
//! - **Partition**: the opcodes of one diff, in order, cover every char offset
//!   of both texts exactly once with non-decreasing offsets.
//! - **Reconstruction**: [`apply_opcodes`] rebuilds the child text.
//! - **Determinism**: ties between equally long matches resolve to the
//!   leftmost match, so identical inputs give identical transcripts.
//!
//! Offsets are Unicode scalar (char) indices, never byte indices.

pub mod engine;
pub mod model;
pub mod render;

pub use engine::{compute_diff, diff_with, SequenceMatcher};
pub use model::{DiffOpcode, Granularity, MatchBlock, OpTag};
pub use render::{apply_opcodes, changed_chars, render_inline, similarity_ratio};

//! Realtime merge of a bulk snapshot and live "new post" events.
//!
//! Merging is a pure function `(state, event) -> (state, outcome)`. The
//! state holds only the authoritative post collection; forests, layouts and
//! diffs are recomputed from it by the caller whenever an outcome reports a
//! change.
//!
//! ```
//! use mutrace_core::merge::{apply, MergeEvent, MergeState};
//!
//! let state = MergeState::new("inc-1");
//! let (state, _) = apply(state, MergeEvent::Connected);
//! let (state, outcome) = apply(state, MergeEvent::SnapshotLoaded(Vec::new()));
//! assert!(!outcome.changed());
//! assert!(state.is_live());
//! ```

pub mod post_set;
pub mod state;

pub use post_set::PostSet;
pub use state::{apply, ConnectionPhase, IgnoreReason, MergeEvent, MergeOutcome, MergeState};

//! Derived, read-only picture of the selected incident.

use mutrace_core::config::EngineConfig;
use mutrace_core::errors::{MutraceError, Result};
use mutrace_core::merge::ConnectionPhase;
use mutrace_core::{
    analyze_post, assign_layout, build_forest, BuildReport, Forest, Layout, MergeState,
    Post, PostAnalysis,
};

/// Everything a presentation layer needs to draw one incident
///
/// Rebuilt from scratch after every merge; never patched in place.
#[derive(Debug, Clone, PartialEq)]
pub struct IncidentView {
    pub incident_id: String,
    /// Subscription generation that produced this view
    pub generation: u64,
    pub phase: ConnectionPhase,
    pub posts: Vec<Post>,
    pub forest: Forest,
    pub report: BuildReport,
    pub layout: Layout,
    /// Most recent transport failure; the rest of the view is the last known state
    pub last_error: Option<MutraceError>,
    /// Channel frames dropped as malformed since the incident was selected
    pub dropped_messages: usize,
}

impl IncidentView {
    /// Build the forest and layout for the merged posts
    pub fn rebuild(state: &MergeState, generation: u64, config: &EngineConfig) -> Self {
        let posts = state.posts().as_slice().to_vec();
        let (mut forest, report) = build_forest(&posts);
        let layout = assign_layout(&forest, &config.layout);
        layout.apply_to(&mut forest);

        Self {
            incident_id: state.incident_id().to_string(),
            generation,
            phase: state.phase(),
            posts,
            forest,
            report,
            layout,
            last_error: None,
            dropped_messages: 0,
        }
    }

    pub fn is_live(&self) -> bool {
        self.phase == ConnectionPhase::Live
    }

    /// Diff and score one post against its parent, on demand
    ///
    /// # Errors
    ///
    /// Returns `PostNotFound` if the post is not part of this view.
    pub fn analyze(&self, post_id: &str, config: &EngineConfig) -> Result<PostAnalysis> {
        analyze_post(&self.posts, post_id, config)
    }
}

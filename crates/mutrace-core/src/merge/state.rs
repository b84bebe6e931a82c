use serde::{Deserialize, Serialize};

use crate::errors::MutraceError;
use crate::merge::post_set::PostSet;
use crate::model::Post;

/// Connection lifecycle of one incident subscription
///
/// `Syncing` and `Live` are both "connected": while `Syncing` the merger is
/// waiting for a bulk snapshot and holds incoming posts back; once the
/// snapshot is merged it is `Live` and merges each post as it arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionPhase {
    Disconnected,
    Syncing,
    Live,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MergeEvent {
    /// Channel opened (initially or after a reconnect); a fresh snapshot must follow
    Connected,
    /// Bulk snapshot resolved
    SnapshotLoaded(Vec<Post>),
    /// One "new_post" message from the live channel
    PostReceived(Post),
    /// Channel closed or failed
    Disconnected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Not accepting events in the current phase
    NotConnected,
    /// The post names a different incident
    OtherIncident,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MergeOutcome {
    /// New posts were appended to the collection
    Appended { count: usize },
    /// Held back until the snapshot is merged
    Buffered,
    /// Id already present; collection unchanged
    Duplicate { post_id: String },
    Ignored { reason: IgnoreReason },
    PhaseChanged {
        from: ConnectionPhase,
        to: ConnectionPhase,
    },
}

impl MergeOutcome {
    /// True when the post collection grew and derived views must be rebuilt
    pub fn changed(&self) -> bool {
        matches!(self, MergeOutcome::Appended { count } if *count > 0)
    }

    /// The discarded-post condition behind this outcome, if any
    pub fn as_error(&self) -> Option<MutraceError> {
        match self {
            MergeOutcome::Duplicate { post_id } => Some(MutraceError::DuplicatePost {
                post_id: post_id.clone(),
            }),
            _ => None,
        }
    }
}

/// Authoritative post collection for one incident plus its connection phase
#[derive(Debug, Clone, PartialEq)]
pub struct MergeState {
    incident_id: String,
    phase: ConnectionPhase,
    posts: PostSet,
    buffered: Vec<Post>,
}

impl MergeState {
    pub fn new(incident_id: impl Into<String>) -> Self {
        Self {
            incident_id: incident_id.into(),
            phase: ConnectionPhase::Disconnected,
            posts: PostSet::new(),
            buffered: Vec::new(),
        }
    }

    pub fn incident_id(&self) -> &str {
        &self.incident_id
    }

    pub fn phase(&self) -> ConnectionPhase {
        self.phase
    }

    pub fn is_live(&self) -> bool {
        self.phase == ConnectionPhase::Live
    }

    pub fn posts(&self) -> &PostSet {
        &self.posts
    }

    pub fn buffered_len(&self) -> usize {
        self.buffered.len()
    }

    fn belongs_here(&self, post: &Post) -> bool {
        post.incident_id
            .as_deref()
            .map_or(true, |id| id == self.incident_id)
    }

    fn transition(&mut self, to: ConnectionPhase) -> MergeOutcome {
        let from = self.phase;
        self.phase = to;
        MergeOutcome::PhaseChanged { from, to }
    }
}

/// Fold one event into the state
///
/// Never fails: events that cannot be merged are reported through the
/// outcome and leave the collection untouched. Replaying any event any
/// number of times cannot produce two entries with the same id.
pub fn apply(mut state: MergeState, event: MergeEvent) -> (MergeState, MergeOutcome) {
    let outcome = match event {
        MergeEvent::Connected => {
            state.buffered.clear();
            state.transition(ConnectionPhase::Syncing)
        }

        MergeEvent::Disconnected => {
            // The collection survives; buffered posts will come back with the next snapshot.
            state.buffered.clear();
            state.transition(ConnectionPhase::Disconnected)
        }

        MergeEvent::SnapshotLoaded(posts) => {
            if state.phase == ConnectionPhase::Disconnected {
                MergeOutcome::Ignored {
                    reason: IgnoreReason::NotConnected,
                }
            } else {
                let mut count = 0;
                for post in posts {
                    if state.belongs_here(&post) && state.posts.insert(post) {
                        count += 1;
                    }
                }
                let held = std::mem::take(&mut state.buffered);
                count += state.posts.extend(held);
                state.phase = ConnectionPhase::Live;
                MergeOutcome::Appended { count }
            }
        }

        MergeEvent::PostReceived(post) => {
            if !state.belongs_here(&post) {
                MergeOutcome::Ignored {
                    reason: IgnoreReason::OtherIncident,
                }
            } else if state.posts.contains(&post.id)
                || state.buffered.iter().any(|held| held.id == post.id)
            {
                MergeOutcome::Duplicate { post_id: post.id }
            } else {
                match state.phase {
                    ConnectionPhase::Disconnected => MergeOutcome::Ignored {
                        reason: IgnoreReason::NotConnected,
                    },
                    ConnectionPhase::Syncing => {
                        state.buffered.push(post);
                        MergeOutcome::Buffered
                    }
                    ConnectionPhase::Live => {
                        state.posts.insert(post);
                        MergeOutcome::Appended { count: 1 }
                    }
                }
            }
        }
    };

    tracing::debug!(
        incident_id = %state.incident_id,
        phase = ?state.phase,
        post_count = state.posts.len(),
        outcome = ?outcome,
        "merge_event"
    );

    (state, outcome)
}

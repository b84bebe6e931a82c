use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Classification of how far a post drifted from its parent
///
/// Derived from the mutation score by configurable thresholds; see
/// [`ScoringThresholds`](crate::config::ScoringThresholds).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MutationType {
    Original,
    Modified,
    Fabricated,
}

impl MutationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MutationType::Original => "ORIGINAL",
            MutationType::Modified => "MODIFIED",
            MutationType::Fabricated => "FABRICATED",
        }
    }
}

impl std::fmt::Display for MutationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single post in an incident's propagation graph
///
/// Posts are immutable once created; the only fields filled in later are the
/// derived `mutation_score` / `mutation_type` pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,

    /// Post this one replies to, quotes or restates (None for patient zero)
    #[serde(default)]
    pub parent_id: Option<String>,

    /// Owning incident, when the wire payload carries it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub incident_id: Option<String>,

    pub author: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,

    /// 0-100 divergence from the parent, None until computed
    #[serde(default)]
    pub mutation_score: Option<f64>,

    /// None reads as ORIGINAL
    #[serde(default)]
    pub mutation_type: Option<MutationType>,
}

impl Post {
    /// Create a root post with no derived fields
    pub fn new(
        id: impl Into<String>,
        author: impl Into<String>,
        content: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            parent_id: None,
            incident_id: None,
            author: author.into(),
            content: content.into(),
            timestamp,
            mutation_score: None,
            mutation_type: None,
        }
    }

    /// Builder: set the parent reference
    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    /// Builder: set the owning incident
    pub fn with_incident(mut self, incident_id: impl Into<String>) -> Self {
        self.incident_id = Some(incident_id.into());
        self
    }

    /// True if the post declares no parent
    pub fn is_patient_zero(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Mutation tag with the ORIGINAL default applied
    pub fn effective_mutation_type(&self) -> MutationType {
        self.mutation_type.unwrap_or(MutationType::Original)
    }

    /// Ordering key used for sibling order: timestamp ascending, then id
    pub(crate) fn sibling_key(&self) -> (DateTime<Utc>, &str) {
        (self.timestamp, self.id.as_str())
    }
}

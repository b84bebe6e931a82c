//! Mutation score: how much of a post's text diverges from its parent.
//!
//! `score = 100 * changed / max(1, parent_len + child_len)` where `changed`
//! counts the chars covered by non-equal opcodes on both sides. The score is
//! 0 for an unchanged restatement and 100 when nothing survives.

use serde::{Deserialize, Serialize};

use crate::config::{EngineConfig, ScoringThresholds};
use crate::diff::{changed_chars, diff_with, DiffOpcode, Granularity};
use crate::hierarchy::invariants::{index_posts, is_in_cycle};
use crate::model::{MutationType, Post};

/// Score and derived tag for one parent/child pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MutationAssessment {
    pub score: f64,
    pub mutation_type: MutationType,
}

/// Score a transcript; always within `[0, 100]`
pub fn score(opcodes: &[DiffOpcode], parent_len: usize, child_len: usize) -> f64 {
    let total = (parent_len + child_len).max(1);
    let raw = 100.0 * changed_chars(opcodes) as f64 / total as f64;
    raw.clamp(0.0, 100.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MutationScorer {
    thresholds: ScoringThresholds,
    granularity: Granularity,
}

impl MutationScorer {
    pub fn new(thresholds: ScoringThresholds, granularity: Granularity) -> Self {
        Self {
            thresholds,
            granularity,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.scoring, config.diff.granularity)
    }

    pub fn thresholds(&self) -> &ScoringThresholds {
        &self.thresholds
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    /// Map a score onto its tag
    pub fn classify(&self, score: f64) -> MutationType {
        if score >= self.thresholds.fabricated_threshold {
            MutationType::Fabricated
        } else if score >= self.thresholds.modified_threshold {
            MutationType::Modified
        } else {
            MutationType::Original
        }
    }

    /// Diff, score and classify a parent/child pair
    pub fn assess(&self, parent: &str, child: &str) -> (Vec<DiffOpcode>, MutationAssessment) {
        let opcodes = diff_with(parent, child, self.granularity);
        let value = score(&opcodes, parent.chars().count(), child.chars().count());
        let assessment = MutationAssessment {
            score: value,
            mutation_type: self.classify(value),
        };
        (opcodes, assessment)
    }

    /// Fill in missing scores for posts whose parent is in `posts`
    ///
    /// Values already present (e.g. computed server-side) are kept. Roots,
    /// posts with an unresolved parent and posts on a parent-reference cycle
    /// stay unscored. When an id repeats, the first occurrence is the parent
    /// text, matching the forest builder. Returns how many posts were
    /// annotated.
    pub fn annotate(&self, posts: &mut [Post]) -> usize {
        let parents: Vec<(usize, String)> = {
            let (index, _) = index_posts(posts);
            posts
                .iter()
                .enumerate()
                .filter(|(_, post)| post.mutation_score.is_none())
                .filter_map(|(i, post)| {
                    let pid = post.parent_id.as_deref().filter(|pid| *pid != post.id)?;
                    let parent = index.get(pid)?;
                    if is_in_cycle(&index, &post.id) {
                        return None;
                    }
                    Some((i, parent.content.clone()))
                })
                .collect()
        };

        for (i, parent_content) in &parents {
            let post = &mut posts[*i];
            let (_, assessment) = self.assess(parent_content, &post.content);
            post.mutation_score = Some(assessment.score);
            post.mutation_type = Some(assessment.mutation_type);
        }
        parents.len()
    }
}

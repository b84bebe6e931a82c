//! On-demand analysis of a single post against its parent.

use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::diff::DiffOpcode;
use crate::errors::{MutraceError, Result};
use crate::hierarchy::invariants::{index_posts, is_in_cycle};
use crate::model::{MutationType, Post};
use crate::scoring::MutationScorer;
use crate::{log_op_end, log_op_error, log_op_start};

/// Post, parent and transcript for one post
///
/// A post with no resolvable parent is patient zero: `parent` is `None`,
/// `diff` is empty and `score` is `None`. Cycle members are patient zero
/// too, since the forest shows them as roots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostAnalysis {
    pub post: Post,
    pub parent: Option<Post>,
    pub diff: Vec<DiffOpcode>,
    pub score: Option<f64>,
    pub mutation_type: MutationType,
}

impl PostAnalysis {
    pub fn is_patient_zero(&self) -> bool {
        self.parent.is_none()
    }
}

/// Diff and score `post_id` against its parent within `posts`
pub fn analyze_post(posts: &[Post], post_id: &str, config: &EngineConfig) -> Result<PostAnalysis> {
    let started = Instant::now();
    log_op_start!("analyze_post", post_id = post_id);

    let (index, _) = index_posts(posts);
    let Some(post) = index.get(post_id).copied() else {
        let err = MutraceError::PostNotFound {
            post_id: post_id.to_string(),
        };
        log_op_error!(
            "analyze_post",
            err.clone(),
            duration_ms = started.elapsed().as_millis() as u64,
            post_id = post_id
        );
        return Err(err);
    };

    let parent = post
        .parent_id
        .as_deref()
        .filter(|pid| *pid != post.id)
        .and_then(|pid| index.get(pid).copied())
        .filter(|_| !is_in_cycle(&index, &post.id));

    let analysis = match parent {
        Some(parent) => {
            let scorer = MutationScorer::from_config(config);
            let (diff, assessment) = scorer.assess(&parent.content, &post.content);
            PostAnalysis {
                post: post.clone(),
                parent: Some(parent.clone()),
                diff,
                score: Some(assessment.score),
                mutation_type: assessment.mutation_type,
            }
        }
        None => PostAnalysis {
            post: post.clone(),
            parent: None,
            diff: Vec::new(),
            score: None,
            mutation_type: MutationType::Original,
        },
    };

    log_op_end!(
        "analyze_post",
        duration_ms = started.elapsed().as_millis() as u64,
        post_id = post_id
    );
    Ok(analysis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::OpTag;
    use chrono::{TimeZone, Utc};

    fn posts() -> Vec<Post> {
        let t = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        vec![
            Post::new("p1", "alice", "The sky is blue", t),
            Post::new("p2", "bob", "The sky is red", t).with_parent("p1"),
            Post::new("p3", "carol", "Lost thread", t).with_parent("gone"),
        ]
    }

    #[test]
    fn test_analyze_child() {
        let analysis = analyze_post(&posts(), "p2", &EngineConfig::default()).unwrap();

        assert_eq!(analysis.parent.as_ref().map(|p| p.id.as_str()), Some("p1"));
        assert_eq!(analysis.diff[0].tag, OpTag::Equal);
        let score = analysis.score.unwrap();
        assert!((score - 17.24).abs() < 0.01);
        assert_eq!(analysis.mutation_type, MutationType::Modified);
    }

    #[test]
    fn test_analyze_root_is_patient_zero() {
        let analysis = analyze_post(&posts(), "p1", &EngineConfig::default()).unwrap();
        assert!(analysis.is_patient_zero());
        assert!(analysis.diff.is_empty());
        assert_eq!(analysis.score, None);
    }

    #[test]
    fn test_analyze_orphan_has_no_parent() {
        let analysis = analyze_post(&posts(), "p3", &EngineConfig::default()).unwrap();
        assert!(analysis.parent.is_none());
        assert_eq!(analysis.mutation_type, MutationType::Original);
    }

    #[test]
    fn test_analyze_cycle_member_is_patient_zero() {
        let t = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let looped = vec![
            Post::new("p", "alice", "The sky is blue", t).with_parent("q"),
            Post::new("q", "bob", "The sky is red", t).with_parent("p"),
        ];

        for id in ["p", "q"] {
            let analysis = analyze_post(&looped, id, &EngineConfig::default()).unwrap();
            assert!(analysis.is_patient_zero());
            assert!(analysis.diff.is_empty());
            assert_eq!(analysis.score, None);
            assert_eq!(analysis.mutation_type, MutationType::Original);
        }
    }

    #[test]
    fn test_analyze_child_of_cycle_keeps_parent() {
        let t = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let looped = vec![
            Post::new("p", "alice", "The sky is blue", t).with_parent("q"),
            Post::new("q", "bob", "The sky is red", t).with_parent("p"),
            Post::new("r", "carol", "The sky is red", t).with_parent("q"),
        ];

        let analysis = analyze_post(&looped, "r", &EngineConfig::default()).unwrap();
        assert_eq!(analysis.parent.as_ref().map(|p| p.id.as_str()), Some("q"));
        assert_eq!(analysis.score, Some(0.0));
    }

    #[test]
    fn test_analyze_unknown_post() {
        let err = analyze_post(&posts(), "nope", &EngineConfig::default()).unwrap_err();
        assert!(matches!(err, MutraceError::PostNotFound { post_id } if post_id == "nope"));
    }

    #[test]
    fn test_analysis_serializes_camel_case() {
        let analysis = analyze_post(&posts(), "p2", &EngineConfig::default()).unwrap();
        let json = serde_json::to_value(&analysis).unwrap();
        assert!(json.get("mutationType").is_some());
        assert_eq!(json["diff"][0][0], "equal");
    }
}

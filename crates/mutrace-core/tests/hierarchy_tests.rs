#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use std::collections::HashSet;

use common::{chain, messy_incident, post_at};
use mutrace_core::config::LayoutConfig;
use mutrace_core::errors::MutraceError;
use mutrace_core::hierarchy::invariants::{find_cycles, find_orphans};
use mutrace_core::{assign_layout, build_forest, Forest, NodeStatus, Post};
use proptest::prelude::*;

#[test]
fn test_messy_incident_keeps_every_post() {
    let posts = messy_incident();
    let (forest, report) = build_forest(&posts);

    assert_eq!(forest.len(), posts.len());
    for post in &posts {
        assert!(forest.get(&post.id).is_some(), "missing {}", post.id);
    }
    assert_eq!(report.orphans, vec!["p5".to_string()]);
    let mut cycles = report.cycles.clone();
    cycles.sort();
    assert_eq!(cycles, vec!["c1".to_string(), "c2".to_string()]);
    assert!(!report.is_clean());
}

#[test]
fn test_messy_incident_structure() {
    let (forest, _) = build_forest(&messy_incident());

    assert_eq!(forest.children_of("p1"), vec!["p2", "p3"]);
    assert_eq!(forest.ancestry("p4").unwrap(), vec!["p1", "p2", "p4"]);
    assert_eq!(forest.descendants_count("p1"), Some(3));
    assert!(matches!(
        forest.get("p5").unwrap().status,
        NodeStatus::Orphan { ref missing_parent } if missing_parent == "missing"
    ));
    assert_eq!(forest.get("c1").unwrap().status, NodeStatus::Cycle);
    assert_eq!(forest.max_depth(), 2);
}

#[test]
fn test_invariant_helpers_agree_with_builder() {
    let posts = messy_incident();
    let (_, report) = build_forest(&posts);

    let orphans: Vec<String> = find_orphans(&posts).into_iter().map(|(id, _)| id).collect();
    assert_eq!(orphans, report.orphans);

    let mut cycles = find_cycles(&posts);
    cycles.sort();
    let mut reported = report.cycles.clone();
    reported.sort();
    assert_eq!(cycles, reported);
}

#[test]
fn test_report_issues_use_error_taxonomy() {
    let (forest, report) = build_forest(&messy_incident());

    let issues = report.issues(&forest);
    assert_eq!(issues.len(), 3);
    assert!(issues.contains(&MutraceError::OrphanPost {
        post_id: "p5".to_string(),
        parent_id: "missing".to_string(),
    }));
    assert!(issues.contains(&MutraceError::CycleDetected {
        post_id: "c1".to_string(),
    }));
}

#[test]
fn test_deep_chain_does_not_overflow() {
    let posts = chain(2_000);
    let (forest, report) = build_forest(&posts);

    assert!(report.is_clean());
    assert_eq!(forest.max_depth(), 1_999);
    assert_eq!(forest.roots().len(), 1);
}

#[test]
fn test_layout_covers_forest() {
    let (forest, _) = build_forest(&messy_incident());
    let layout = assign_layout(&forest, &LayoutConfig::default());

    assert_eq!(layout.len(), forest.len());
    let root = layout.get("p1").unwrap();
    let left = layout.get("p2").unwrap();
    let right = layout.get("p3").unwrap();
    assert!(left.x < right.x);
    assert!(root.y < left.y);

    // Leaves: p4, p3, p5, c1, c2 each take one slot.
    assert_eq!(forest.leaf_count(), 5);
    assert_eq!(layout.horizontal_extent(), Some((0.0, 1200.0)));
}

fn arbitrary_posts() -> impl Strategy<Value = Vec<Post>> {
    proptest::collection::vec((0..12usize, proptest::option::of(0..14usize), 0..5i64), 0..24)
        .prop_map(|raw| {
            raw.into_iter()
                .map(|(id, parent, offset)| {
                    let id = format!("n{}", id);
                    let parent = parent.map(|p| format!("n{}", p));
                    post_at(&id, parent.as_deref(), "text", offset)
                })
                .collect()
        })
}

/// Id-distinct posts paired with a permutation of themselves
///
/// Duplicates keep their first occurrence, so only id-distinct inputs are
/// order independent.
fn unique_posts_and_permutation() -> impl Strategy<Value = (Vec<Post>, Vec<Post>)> {
    arbitrary_posts()
        .prop_map(|posts| {
            let mut seen = HashSet::new();
            posts
                .into_iter()
                .filter(|p| seen.insert(p.id.clone()))
                .collect::<Vec<_>>()
        })
        .prop_flat_map(|unique| (Just(unique.clone()), Just(unique).prop_shuffle()))
}

/// Pre-order `(id, depth, parent id, status)` for structural comparison
fn shape(forest: &Forest) -> Vec<(String, usize, Option<String>, NodeStatus)> {
    forest
        .nodes()
        .iter()
        .map(|n| {
            let parent = n.parent.map(|p| forest.node(p).id().to_string());
            (n.id().to_string(), n.depth, parent, n.status.clone())
        })
        .collect()
}

proptest! {
    #[test]
    fn prop_forest_partitions_distinct_ids(posts in arbitrary_posts()) {
        let (forest, report) = build_forest(&posts);

        let mut distinct: Vec<&str> = posts.iter().map(|p| p.id.as_str()).collect();
        distinct.sort();
        distinct.dedup();
        prop_assert_eq!(forest.len(), distinct.len());
        for dup in &report.duplicates {
            prop_assert!(posts.iter().filter(|p| &p.id == dup).count() > 1);
        }

        let reachable: usize = forest
            .roots()
            .iter()
            .map(|&r| 1 + forest.descendants_count(forest.node(r).id()).unwrap())
            .sum();
        prop_assert_eq!(reachable, forest.len());
    }

    #[test]
    fn prop_forest_independent_of_input_order(
        (unique, shuffled) in unique_posts_and_permutation()
    ) {
        let (a, _) = build_forest(&unique);
        let (b, _) = build_forest(&shuffled);
        prop_assert_eq!(shape(&a), shape(&b));
        prop_assert_eq!(a.roots().len(), b.roots().len());
    }

    #[test]
    fn prop_layout_parents_within_children_and_siblings_disjoint(posts in arbitrary_posts()) {
        let config = LayoutConfig {
            horizontal_spacing: 1.0,
            vertical_spacing: 2.0,
        };
        let (forest, _) = build_forest(&posts);
        let layout = assign_layout(&forest, &config);
        let nodes = forest.nodes();
        let xs: Vec<f64> = nodes.iter().map(|n| layout.get(n.id()).unwrap().x).collect();

        // Horizontal span of each node's subtree, children before parents.
        let mut spans: Vec<(f64, f64)> = xs.iter().map(|&x| (x, x)).collect();
        for idx in (0..nodes.len()).rev() {
            for &c in &nodes[idx].children {
                spans[idx] = (spans[idx].0.min(spans[c].0), spans[idx].1.max(spans[c].1));
            }
        }

        for (idx, node) in nodes.iter().enumerate() {
            prop_assert_eq!(layout.get(node.id()).unwrap().y, node.depth as f64 * 2.0);
            if !node.children.is_empty() {
                let lo = node.children.iter().map(|&c| spans[c].0).fold(f64::INFINITY, f64::min);
                let hi = node.children.iter().map(|&c| spans[c].1).fold(f64::NEG_INFINITY, f64::max);
                prop_assert!(xs[idx] >= lo - 1e-9 && xs[idx] <= hi + 1e-9, "{} outside its subtree", node.id());
            }
            for pair in node.children.windows(2) {
                prop_assert!(spans[pair[0]].1 + 0.5 <= spans[pair[1]].0, "siblings of {} overlap", node.id());
            }
        }
        for pair in forest.roots().windows(2) {
            prop_assert!(spans[pair[0]].1 + 0.5 <= spans[pair[1]].0, "root subtrees overlap");
        }
    }
}

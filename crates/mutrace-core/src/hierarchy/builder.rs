use std::collections::HashMap;
use std::time::Instant;

use crate::hierarchy::forest::{BuildReport, Forest, NodeIndex, NodeStatus, TreeNode};
use crate::hierarchy::invariants::{index_posts, is_in_cycle};
use crate::model::Post;
use crate::{log_op_end, log_op_start};

/// Build the propagation forest for a flat post list
///
/// Every distinct post id appears exactly once in the result:
///
/// - posts without a parent are roots
/// - posts whose parent is present are attached under it
/// - posts whose parent is absent are kept as [`NodeStatus::Orphan`] roots
/// - posts that are their own ancestor are isolated as [`NodeStatus::Cycle`] roots
///
/// Roots and siblings are ordered by timestamp ascending, ties broken by id,
/// so the result does not depend on input order. Repeated ids keep their
/// first occurrence and are listed in [`BuildReport::duplicates`].
pub fn build_forest(posts: &[Post]) -> (Forest, BuildReport) {
    let started = Instant::now();
    log_op_start!("build_forest", post_count = posts.len());

    let (index, mut duplicates) = index_posts(posts);

    let mut report = BuildReport::default();
    let mut root_posts: Vec<(&Post, NodeStatus)> = Vec::new();
    let mut children: HashMap<&str, Vec<&Post>> = HashMap::new();

    for &post in index.values() {
        let status = match post.parent_id.as_deref() {
            None => NodeStatus::Root,
            Some(parent_id) if parent_id == post.id => NodeStatus::Cycle,
            Some(parent_id) if !index.contains_key(parent_id) => NodeStatus::Orphan {
                missing_parent: parent_id.to_string(),
            },
            Some(_) if is_in_cycle(&index, &post.id) => NodeStatus::Cycle,
            Some(parent_id) => {
                children.entry(parent_id).or_default().push(post);
                continue;
            }
        };

        match &status {
            NodeStatus::Cycle => {
                tracing::warn!(post_id = %post.id, "post is its own ancestor; isolated as root");
                report.cycles.push(post.id.clone());
            }
            NodeStatus::Orphan { missing_parent } => {
                tracing::debug!(post_id = %post.id, parent_id = %missing_parent, "parent not present; kept as root");
                report.orphans.push(post.id.clone());
            }
            NodeStatus::Root | NodeStatus::Attached => {}
        }
        root_posts.push((post, status));
    }

    root_posts.sort_by(|(a, _), (b, _)| a.sibling_key().cmp(&b.sibling_key()));
    for siblings in children.values_mut() {
        siblings.sort_by(|a, b| a.sibling_key().cmp(&b.sibling_key()));
    }

    let mut forest = Forest {
        nodes: Vec::with_capacity(index.len()),
        roots: Vec::with_capacity(root_posts.len()),
        index: HashMap::with_capacity(index.len()),
    };

    // Iterative pre-order walk; children are pushed reversed so they pop in sibling order.
    let mut stack: Vec<(&Post, NodeStatus, Option<NodeIndex>, usize)> = root_posts
        .into_iter()
        .rev()
        .map(|(post, status)| (post, status, None, 0))
        .collect();

    while let Some((post, status, parent, depth)) = stack.pop() {
        let idx = forest.nodes.len();
        forest.nodes.push(TreeNode {
            post: post.clone(),
            depth,
            parent,
            children: Vec::new(),
            status,
            layout_position: None,
        });
        forest.index.insert(post.id.clone(), idx);
        match parent {
            Some(parent_idx) => forest.node_mut(parent_idx).children.push(idx),
            None => forest.roots.push(idx),
        }

        if let Some(kids) = children.get(post.id.as_str()) {
            for &kid in kids.iter().rev() {
                stack.push((kid, NodeStatus::Attached, Some(idx), depth + 1));
            }
        }
    }

    report.orphans.sort();
    report.cycles.sort();
    duplicates.sort();
    duplicates.dedup();
    report.duplicates = duplicates;

    log_op_end!(
        "build_forest",
        duration_ms = started.elapsed().as_millis() as u64,
        root_count = forest.roots.len(),
        orphan_count = report.orphans.len(),
        cycle_count = report.cycles.len()
    );

    (forest, report)
}

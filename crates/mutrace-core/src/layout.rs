//! Layered tree layout for the propagation view.
//!
//! `y` grows with depth. Leaves take consecutive horizontal slots in forest
//! pre-order; every internal node sits at the mean `x` of its children. Each
//! subtree therefore owns a contiguous slot range, sibling subtrees never
//! overlap, and a node's `x` lies within the span of its descendants.

use std::collections::BTreeMap;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::config::LayoutConfig;
use crate::hierarchy::Forest;
use crate::{log_op_end, log_op_start};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// Coordinates keyed by post id
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub positions: BTreeMap<String, Position>,
}

impl Layout {
    pub fn get(&self, post_id: &str) -> Option<Position> {
        self.positions.get(post_id).copied()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Copy positions onto the forest's nodes
    pub fn apply_to(&self, forest: &mut Forest) {
        for node in &mut forest.nodes {
            node.layout_position = self.positions.get(&node.post.id).copied();
        }
    }

    /// `(min_x, max_x)` over all nodes, None when empty
    pub fn horizontal_extent(&self) -> Option<(f64, f64)> {
        self.positions.values().fold(None, |acc, p| match acc {
            None => Some((p.x, p.x)),
            Some((lo, hi)) => Some((lo.min(p.x), hi.max(p.x))),
        })
    }
}

/// Assign coordinates to every node of `forest`
pub fn assign_layout(forest: &Forest, config: &LayoutConfig) -> Layout {
    let started = Instant::now();
    log_op_start!("assign_layout", post_count = forest.len());

    let nodes = forest.nodes();
    let mut xs = vec![0.0_f64; nodes.len()];

    // Pre-order visits leaves left to right.
    let mut slot = 0_usize;
    for (idx, node) in nodes.iter().enumerate() {
        if node.is_leaf() {
            xs[idx] = slot as f64 * config.horizontal_spacing;
            slot += 1;
        }
    }

    // Children always follow their parent in pre-order, so a reverse sweep
    // sees every child before its parent.
    for idx in (0..nodes.len()).rev() {
        let children = &nodes[idx].children;
        if !children.is_empty() {
            let sum: f64 = children.iter().map(|&c| xs[c]).sum();
            xs[idx] = sum / children.len() as f64;
        }
    }

    let positions = nodes
        .iter()
        .zip(xs)
        .map(|(node, x)| {
            (
                node.post.id.clone(),
                Position {
                    x,
                    y: node.depth as f64 * config.vertical_spacing,
                },
            )
        })
        .collect();

    log_op_end!(
        "assign_layout",
        duration_ms = started.elapsed().as_millis() as u64,
        leaf_slots = slot
    );

    Layout { positions }
}

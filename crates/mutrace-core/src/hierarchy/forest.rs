use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::errors::MutraceError;
use crate::layout::Position;
use crate::model::Post;

/// Position of a node in [`Forest::nodes`]
pub type NodeIndex = usize;

/// How a node ended up where it is
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeStatus {
    /// Declared no parent (patient zero)
    Root,
    /// Hangs under its declared parent
    Attached,
    /// Declared parent is not in the post set; kept as a root
    Orphan { missing_parent: String },
    /// Sits on a parent-reference cycle; isolated as a root
    Cycle,
}

impl NodeStatus {
    /// True for every status that places the node at depth 0
    pub fn is_root(&self) -> bool {
        !matches!(self, NodeStatus::Attached)
    }
}

/// A post placed in the forest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
    pub post: Post,
    pub depth: usize,
    pub parent: Option<NodeIndex>,
    pub children: Vec<NodeIndex>,
    pub status: NodeStatus,
    /// Filled in by [`Layout::apply_to`](crate::layout::Layout::apply_to)
    pub layout_position: Option<Position>,
}

impl TreeNode {
    pub fn id(&self) -> &str {
        &self.post.id
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Integrity findings from one build, all id lists sorted
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildReport {
    pub orphans: Vec<String>,
    pub cycles: Vec<String>,
    pub duplicates: Vec<String>,
}

impl BuildReport {
    pub fn is_clean(&self) -> bool {
        self.orphans.is_empty() && self.cycles.is_empty() && self.duplicates.is_empty()
    }

    /// The findings expressed in the error taxonomy
    pub fn issues(&self, forest: &Forest) -> Vec<MutraceError> {
        let mut issues = Vec::with_capacity(self.orphans.len() + self.cycles.len());
        for post_id in &self.cycles {
            issues.push(MutraceError::CycleDetected {
                post_id: post_id.clone(),
            });
        }
        for post_id in &self.orphans {
            if let Some(NodeStatus::Orphan { missing_parent }) =
                forest.get(post_id).map(|n| &n.status)
            {
                issues.push(MutraceError::OrphanPost {
                    post_id: post_id.clone(),
                    parent_id: missing_parent.clone(),
                });
            }
        }
        issues
    }
}

/// Rooted forest over one incident's posts
///
/// Nodes are stored in pre-order: roots in sibling order, each followed by
/// its subtree. The forest is rebuilt from scratch on every change to the
/// post set and never patched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Forest {
    pub(crate) nodes: Vec<TreeNode>,
    pub(crate) roots: Vec<NodeIndex>,
    pub(crate) index: HashMap<String, NodeIndex>,
}

impl Forest {
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes in pre-order
    pub fn nodes(&self) -> &[TreeNode] {
        &self.nodes
    }

    pub fn roots(&self) -> &[NodeIndex] {
        &self.roots
    }

    pub fn node(&self, idx: NodeIndex) -> &TreeNode {
        &self.nodes[idx]
    }

    pub fn get(&self, post_id: &str) -> Option<&TreeNode> {
        self.index.get(post_id).map(|&idx| &self.nodes[idx])
    }

    pub fn index_of(&self, post_id: &str) -> Option<NodeIndex> {
        self.index.get(post_id).copied()
    }

    /// Parent node of `post_id`, if it is attached
    pub fn parent_of(&self, post_id: &str) -> Option<&TreeNode> {
        self.get(post_id)
            .and_then(|node| node.parent)
            .map(|idx| &self.nodes[idx])
    }

    /// Child ids of `post_id` in sibling order
    pub fn children_of(&self, post_id: &str) -> Vec<&str> {
        self.get(post_id)
            .map(|node| node.children.iter().map(|&c| self.nodes[c].id()).collect())
            .unwrap_or_default()
    }

    /// Ids from the root down to `post_id` inclusive
    pub fn ancestry(&self, post_id: &str) -> Option<Vec<&str>> {
        let mut idx = self.index_of(post_id)?;
        let mut path = vec![self.nodes[idx].id()];
        while let Some(parent) = self.nodes[idx].parent {
            path.push(self.nodes[parent].id());
            idx = parent;
        }
        path.reverse();
        Some(path)
    }

    /// Size of the subtree below `post_id`, excluding the node itself
    pub fn descendants_count(&self, post_id: &str) -> Option<usize> {
        let start = self.index_of(post_id)?;
        let mut count = 0;
        let mut stack = self.nodes[start].children.clone();
        while let Some(idx) = stack.pop() {
            count += 1;
            stack.extend_from_slice(&self.nodes[idx].children);
        }
        Some(count)
    }

    /// `(parent_id, child_id)` for every attached node, in pre-order
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str)> {
        self.nodes.iter().filter_map(move |node| {
            node.parent
                .map(|parent| (self.nodes[parent].id(), node.id()))
        })
    }

    pub fn max_depth(&self) -> usize {
        self.nodes.iter().map(|n| n.depth).max().unwrap_or(0)
    }

    pub fn leaf_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    pub(crate) fn node_mut(&mut self, idx: NodeIndex) -> &mut TreeNode {
        &mut self.nodes[idx]
    }
}

//! Transcript types.

use serde::{Deserialize, Serialize};

/// Edit operation label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpTag {
    Equal,
    Replace,
    Delete,
    Insert,
}

impl OpTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            OpTag::Equal => "equal",
            OpTag::Replace => "replace",
            OpTag::Delete => "delete",
            OpTag::Insert => "insert",
        }
    }
}

/// One labelled span pair: `parent[i1..i2]` becomes `child[j1..j2]`
///
/// Serialises as the tuple `["replace", i1, i2, j1, j2]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(
    from = "(OpTag, usize, usize, usize, usize)",
    into = "(OpTag, usize, usize, usize, usize)"
)]
pub struct DiffOpcode {
    pub tag: OpTag,
    pub i1: usize,
    pub i2: usize,
    pub j1: usize,
    pub j2: usize,
}

impl DiffOpcode {
    pub fn new(tag: OpTag, i1: usize, i2: usize, j1: usize, j2: usize) -> Self {
        Self {
            tag,
            i1,
            i2,
            j1,
            j2,
        }
    }

    /// Width of the parent-side span
    pub fn parent_len(&self) -> usize {
        self.i2 - self.i1
    }

    /// Width of the child-side span
    pub fn child_len(&self) -> usize {
        self.j2 - self.j1
    }
}

impl From<(OpTag, usize, usize, usize, usize)> for DiffOpcode {
    fn from((tag, i1, i2, j1, j2): (OpTag, usize, usize, usize, usize)) -> Self {
        Self::new(tag, i1, i2, j1, j2)
    }
}

impl From<DiffOpcode> for (OpTag, usize, usize, usize, usize) {
    fn from(op: DiffOpcode) -> Self {
        (op.tag, op.i1, op.i2, op.j1, op.j2)
    }
}

/// A maximal run where `a[a..a+size] == b[b..b+size]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchBlock {
    pub a: usize,
    pub b: usize,
    pub size: usize,
}

/// Token unit used for alignment
///
/// Offsets in the resulting opcodes are char offsets either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    #[default]
    Char,
    /// Maximal runs of whitespace or of non-whitespace
    Word,
}

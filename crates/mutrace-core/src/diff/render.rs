//! Reading transcripts back: reconstruction, inline rendering, ratios.

use crate::diff::model::{DiffOpcode, OpTag};

fn span(chars: &[char], from: usize, to: usize) -> String {
    chars
        .get(from..to)
        .map(|s| s.iter().collect())
        .unwrap_or_default()
}

/// Rebuild the child text from the parent and the transcript
///
/// Equal spans are taken from the parent and insert/replace spans from the
/// child, so a transcript that does not describe the pair will not
/// reproduce `child`.
pub fn apply_opcodes(parent: &str, child: &str, opcodes: &[DiffOpcode]) -> String {
    let a: Vec<char> = parent.chars().collect();
    let b: Vec<char> = child.chars().collect();
    let mut out = String::with_capacity(child.len());

    for op in opcodes {
        match op.tag {
            OpTag::Equal => out.push_str(&span(&a, op.i1, op.i2)),
            OpTag::Replace | OpTag::Insert => out.push_str(&span(&b, op.j1, op.j2)),
            OpTag::Delete => {}
        }
    }

    out
}

/// Unified inline rendering: `[-removed-]{+added+}`
pub fn render_inline(parent: &str, child: &str, opcodes: &[DiffOpcode]) -> String {
    let a: Vec<char> = parent.chars().collect();
    let b: Vec<char> = child.chars().collect();
    let mut out = String::new();

    for op in opcodes {
        match op.tag {
            OpTag::Equal => out.push_str(&span(&b, op.j1, op.j2)),
            OpTag::Delete => {
                out.push_str("[-");
                out.push_str(&span(&a, op.i1, op.i2));
                out.push_str("-]");
            }
            OpTag::Insert => {
                out.push_str("{+");
                out.push_str(&span(&b, op.j1, op.j2));
                out.push_str("+}");
            }
            OpTag::Replace => {
                out.push_str("[-");
                out.push_str(&span(&a, op.i1, op.i2));
                out.push_str("-]{+");
                out.push_str(&span(&b, op.j1, op.j2));
                out.push_str("+}");
            }
        }
    }

    out
}

/// Chars covered by non-equal opcodes, counted on both sides
pub fn changed_chars(opcodes: &[DiffOpcode]) -> usize {
    opcodes
        .iter()
        .filter(|op| op.tag != OpTag::Equal)
        .map(|op| op.parent_len() + op.child_len())
        .sum()
}

/// `2 * matched / (parent_len + child_len)`; 1.0 for two empty texts
pub fn similarity_ratio(opcodes: &[DiffOpcode], parent_len: usize, child_len: usize) -> f64 {
    let total = parent_len + child_len;
    if total == 0 {
        return 1.0;
    }
    let matched: usize = opcodes
        .iter()
        .filter(|op| op.tag == OpTag::Equal)
        .map(DiffOpcode::child_len)
        .sum();
    (2 * matched) as f64 / total as f64
}

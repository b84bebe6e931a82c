//! Block-matching alignment (Ratcliff/Obershelp).
//!
//! The matcher repeatedly takes the longest common block of the unmatched
//! ranges, then recurses into the ranges left and right of it. The gaps
//! between matched blocks become delete/insert/replace opcodes.

use std::collections::HashMap;
use std::hash::Hash;

use crate::diff::model::{DiffOpcode, Granularity, MatchBlock, OpTag};

/// Alignment of two token sequences
///
/// No junk heuristics are applied: every token is eligible for matching,
/// which keeps results independent of sequence length.
pub struct SequenceMatcher<'a, T> {
    a: &'a [T],
    b: &'a [T],
    /// Positions of each token in `b`, ascending
    b2j: HashMap<&'a T, Vec<usize>>,
}

impl<'a, T: Eq + Hash> SequenceMatcher<'a, T> {
    pub fn new(a: &'a [T], b: &'a [T]) -> Self {
        let mut b2j: HashMap<&'a T, Vec<usize>> = HashMap::new();
        for (j, token) in b.iter().enumerate() {
            b2j.entry(token).or_default().push(j);
        }
        Self { a, b, b2j }
    }

    /// Longest block with `alo <= i < ahi` and `blo <= j < bhi`
    ///
    /// Among equally long blocks the one starting earliest in `a` wins, then
    /// the one starting earliest in `b`. Returns a zero-size block at
    /// `(alo, blo)` when nothing matches.
    pub fn find_longest_match(&self, alo: usize, ahi: usize, blo: usize, bhi: usize) -> MatchBlock {
        let mut best = MatchBlock {
            a: alo,
            b: blo,
            size: 0,
        };
        // j2len[j]: length of the match ending at a[i-1], b[j]
        let mut j2len: HashMap<usize, usize> = HashMap::new();

        for i in alo..ahi {
            let mut next: HashMap<usize, usize> = HashMap::new();
            if let Some(positions) = self.b2j.get(&self.a[i]) {
                for &j in positions {
                    if j < blo {
                        continue;
                    }
                    if j >= bhi {
                        break;
                    }
                    let k = j
                        .checked_sub(1)
                        .and_then(|prev| j2len.get(&prev))
                        .copied()
                        .unwrap_or(0)
                        + 1;
                    next.insert(j, k);
                    if k > best.size {
                        best = MatchBlock {
                            a: i + 1 - k,
                            b: j + 1 - k,
                            size: k,
                        };
                    }
                }
            }
            j2len = next;
        }

        best
    }

    /// All matching blocks in ascending order, adjacent blocks coalesced
    ///
    /// The last element is always the zero-size sentinel `(len_a, len_b, 0)`.
    pub fn matching_blocks(&self) -> Vec<MatchBlock> {
        let (la, lb) = (self.a.len(), self.b.len());
        let mut pending = vec![(0, la, 0, lb)];
        let mut found = Vec::new();

        while let Some((alo, ahi, blo, bhi)) = pending.pop() {
            let m = self.find_longest_match(alo, ahi, blo, bhi);
            if m.size == 0 {
                continue;
            }
            if alo < m.a && blo < m.b {
                pending.push((alo, m.a, blo, m.b));
            }
            if m.a + m.size < ahi && m.b + m.size < bhi {
                pending.push((m.a + m.size, ahi, m.b + m.size, bhi));
            }
            found.push(m);
        }
        found.sort_by_key(|m| (m.a, m.b));

        let mut blocks: Vec<MatchBlock> = Vec::with_capacity(found.len() + 1);
        for m in found {
            match blocks.last_mut() {
                Some(last) if last.a + last.size == m.a && last.b + last.size == m.b => {
                    last.size += m.size;
                }
                _ => blocks.push(m),
            }
        }
        blocks.push(MatchBlock {
            a: la,
            b: lb,
            size: 0,
        });
        blocks
    }

    /// Edit transcript turning `a` into `b`
    pub fn opcodes(&self) -> Vec<DiffOpcode> {
        let mut ops = Vec::new();
        let (mut i, mut j) = (0, 0);

        for m in self.matching_blocks() {
            let tag = match (i < m.a, j < m.b) {
                (true, true) => Some(OpTag::Replace),
                (true, false) => Some(OpTag::Delete),
                (false, true) => Some(OpTag::Insert),
                (false, false) => None,
            };
            if let Some(tag) = tag {
                ops.push(DiffOpcode::new(tag, i, m.a, j, m.b));
            }
            i = m.a + m.size;
            j = m.b + m.size;
            if m.size > 0 {
                ops.push(DiffOpcode::new(OpTag::Equal, m.a, i, m.b, j));
            }
        }

        ops
    }
}

/// Character-level transcript from `parent` to `child`
///
/// Total over all inputs: two empty strings give an empty transcript, an
/// empty parent gives a single insert, identical texts a single equal.
pub fn compute_diff(parent: &str, child: &str) -> Vec<DiffOpcode> {
    let a: Vec<char> = parent.chars().collect();
    let b: Vec<char> = child.chars().collect();
    SequenceMatcher::new(&a, &b).opcodes()
}

/// Transcript at the requested granularity, offsets always in chars
pub fn diff_with(parent: &str, child: &str, granularity: Granularity) -> Vec<DiffOpcode> {
    match granularity {
        Granularity::Char => compute_diff(parent, child),
        Granularity::Word => {
            let (a_tokens, a_bounds) = tokenize_words(parent);
            let (b_tokens, b_bounds) = tokenize_words(child);
            SequenceMatcher::new(&a_tokens, &b_tokens)
                .opcodes()
                .into_iter()
                .map(|op| {
                    DiffOpcode::new(
                        op.tag,
                        a_bounds[op.i1],
                        a_bounds[op.i2],
                        b_bounds[op.j1],
                        b_bounds[op.j2],
                    )
                })
                .collect()
        }
    }
}

/// Split into maximal whitespace / non-whitespace runs
///
/// `bounds[k]` is the char offset where token `k` starts; `bounds` has one
/// trailing entry equal to the total char count.
fn tokenize_words(text: &str) -> (Vec<&str>, Vec<usize>) {
    let mut tokens = Vec::new();
    let mut bounds = vec![0];
    let mut start_byte = 0;
    let mut chars_seen = 0;
    let mut current_ws: Option<bool> = None;

    for (byte_idx, ch) in text.char_indices() {
        let ws = ch.is_whitespace();
        if let Some(prev) = current_ws {
            if prev != ws {
                tokens.push(&text[start_byte..byte_idx]);
                bounds.push(chars_seen);
                start_byte = byte_idx;
            }
        }
        current_ws = Some(ws);
        chars_seen += 1;
    }
    if current_ws.is_some() {
        tokens.push(&text[start_byte..]);
        bounds.push(chars_seen);
    }

    (tokens, bounds)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(ops: &[DiffOpcode]) -> Vec<OpTag> {
        ops.iter().map(|op| op.tag).collect()
    }

    #[test]
    fn test_identical_is_single_equal() {
        let ops = compute_diff("same text", "same text");
        assert_eq!(ops, vec![DiffOpcode::new(OpTag::Equal, 0, 9, 0, 9)]);
    }

    #[test]
    fn test_both_empty_is_empty() {
        assert!(compute_diff("", "").is_empty());
    }

    #[test]
    fn test_empty_parent_is_single_insert() {
        let ops = compute_diff("", "new claim");
        assert_eq!(ops, vec![DiffOpcode::new(OpTag::Insert, 0, 0, 0, 9)]);
    }

    #[test]
    fn test_empty_child_is_single_delete() {
        let ops = compute_diff("gone", "");
        assert_eq!(ops, vec![DiffOpcode::new(OpTag::Delete, 0, 4, 0, 0)]);
    }

    #[test]
    fn test_sky_example() {
        let ops = compute_diff("The sky is blue", "The sky is red");

        assert_eq!(ops[0], DiffOpcode::new(OpTag::Equal, 0, 11, 0, 11));
        assert_eq!(
            tags(&ops),
            vec![OpTag::Equal, OpTag::Replace, OpTag::Equal, OpTag::Insert]
        );
        // "blu" -> "r", shared "e", then "d" appended
        assert_eq!(ops[1], DiffOpcode::new(OpTag::Replace, 11, 14, 11, 12));
        assert_eq!(ops[2], DiffOpcode::new(OpTag::Equal, 14, 15, 12, 13));
        assert_eq!(ops[3], DiffOpcode::new(OpTag::Insert, 15, 15, 13, 14));
    }

    #[test]
    fn test_leftmost_match_wins_ties() {
        // "ab" occurs twice in the parent; the first occurrence is matched
        let ops = compute_diff("abxab", "ab");
        assert_eq!(
            ops,
            vec![
                DiffOpcode::new(OpTag::Equal, 0, 2, 0, 2),
                DiffOpcode::new(OpTag::Delete, 2, 5, 2, 2),
            ]
        );
    }

    #[test]
    fn test_offsets_count_chars_not_bytes() {
        let ops = compute_diff("café ☕", "café ☕!");
        assert_eq!(
            ops,
            vec![
                DiffOpcode::new(OpTag::Equal, 0, 6, 0, 6),
                DiffOpcode::new(OpTag::Insert, 6, 6, 6, 7),
            ]
        );
    }

    #[test]
    fn test_adjacent_blocks_coalesce() {
        let a: Vec<char> = "abcd".chars().collect();
        let b: Vec<char> = "abcd".chars().collect();
        let blocks = SequenceMatcher::new(&a, &b).matching_blocks();
        assert_eq!(
            blocks,
            vec![
                MatchBlock { a: 0, b: 0, size: 4 },
                MatchBlock { a: 4, b: 4, size: 0 },
            ]
        );
    }

    #[test]
    fn test_tokenize_words() {
        let (tokens, bounds) = tokenize_words("The  sky\tis");
        assert_eq!(tokens, vec!["The", "  ", "sky", "\t", "is"]);
        assert_eq!(bounds, vec![0, 3, 5, 8, 9, 11]);

        let (tokens, bounds) = tokenize_words("");
        assert!(tokens.is_empty());
        assert_eq!(bounds, vec![0]);
    }

    #[test]
    fn test_word_granularity_replaces_whole_word() {
        let ops = diff_with("The sky is blue", "The sky is red", Granularity::Word);
        assert_eq!(
            ops,
            vec![
                DiffOpcode::new(OpTag::Equal, 0, 11, 0, 11),
                DiffOpcode::new(OpTag::Replace, 11, 15, 11, 14),
            ]
        );
    }

    #[test]
    fn test_repeated_runs_are_identical() {
        let parent = "Officials confirm the bridge closed on Monday";
        let child = "Officials deny the bridge ever closed, sources say";
        assert_eq!(compute_diff(parent, child), compute_diff(parent, child));
    }
}

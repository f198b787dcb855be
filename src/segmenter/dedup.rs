//! Redundancy filters applied to extracted blocks.
//!
//! Blocks come out of the reverse scan with plenty of overlap: wrapper
//! elements repeat the text of their children and templates repeat teasers.
//! The passes here remove that overlap in three steps, each keeping the more
//! specific block.

use std::collections::HashSet;
use std::time::Duration;

use sha2::{Digest, Sha256};
use similar::TextDiff;
use tracing::debug;

use super::markup::MarkupNode;
use super::{ContentBlock, SegmenterConfig};

/// Upper bound on one character diff; past it the diff settles for an
/// approximate match set, which can only lower the ratio.
const DIFF_TIMEOUT: Duration = Duration::from_millis(50);

/// A block still carrying the element its title came from
#[derive(Debug, Clone)]
pub(crate) struct DraftBlock<N> {
    pub title: String,
    pub content: String,
    pub origin: N,
}

impl<N> From<DraftBlock<N>> for ContentBlock {
    fn from(draft: DraftBlock<N>) -> Self {
        ContentBlock {
            title: draft.title,
            content: draft.content,
        }
    }
}

/// Hex SHA-256 of a (title, content) pair
pub fn content_hash(title: &str, content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(title.as_bytes());
    hasher.update([0u8]);
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Tracks which (title, content) pairs a page already emitted
#[derive(Debug, Default)]
pub(crate) struct SeenHashes(HashSet<String>);

impl SeenHashes {
    /// Record the pair; false when it was already present
    pub fn insert(&mut self, title: &str, content: &str) -> bool {
        self.0.insert(content_hash(title, content))
    }
}

/// Similarity of two strings in `[0, 1]`: twice the number of matching
/// characters over the total length.
pub fn similarity_ratio(a: &str, b: &str) -> f32 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    TextDiff::configure()
        .timeout(DIFF_TIMEOUT)
        .diff_chars(a, b)
        .ratio()
}

/// True when the similarity of `a` and `b` exceeds `threshold`.
///
/// The ratio can never exceed `2 * min / (len_a + len_b)`, which lets most
/// pairs of very different lengths skip the diff entirely.
fn similar_above(a: &str, b: &str, threshold: f32) -> bool {
    let (la, lb) = (char_len(a), char_len(b));
    if la + lb == 0 {
        return true;
    }
    let bound = 2.0 * la.min(lb) as f32 / (la + lb) as f32;
    if bound <= threshold {
        return false;
    }
    similarity_ratio(a, b) > threshold
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Drop every block whose origin strictly contains another block's origin.
pub(crate) fn drop_containing_blocks<N: MarkupNode>(blocks: Vec<DraftBlock<N>>) -> Vec<DraftBlock<N>> {
    let redundant: Vec<bool> = blocks
        .iter()
        .map(|outer| {
            blocks
                .iter()
                .any(|inner| inner.origin.is_descendant_of(&outer.origin))
        })
        .collect();

    blocks
        .into_iter()
        .zip(redundant)
        .filter_map(|(block, drop)| {
            if drop {
                debug!("Dropping wrapper block '{}'", block.title);
                None
            } else {
                Some(block)
            }
        })
        .collect()
}

/// Drop over-long blocks, then blocks that merely wrap a shorter block.
///
/// `A` wraps `B` when `A` is more than `wrapper_length_ratio` times longer and
/// either contains `B` verbatim or is nearly identical to it.
pub(crate) fn drop_long_and_wrapper_blocks(
    blocks: Vec<ContentBlock>,
    config: &SegmenterConfig,
) -> Vec<ContentBlock> {
    let blocks: Vec<ContentBlock> = blocks
        .into_iter()
        .filter(|b| char_len(&b.content) <= config.max_block_chars)
        .collect();

    let lengths: Vec<usize> = blocks.iter().map(|b| char_len(&b.content)).collect();

    let keep: Vec<bool> = blocks
        .iter()
        .enumerate()
        .map(|(i, a)| {
            !blocks.iter().enumerate().any(|(j, b)| {
                i != j
                    && lengths[i] as f32 > lengths[j] as f32 * config.wrapper_length_ratio
                    && (a.content.contains(b.content.as_str())
                        || similar_above(&a.content, &b.content, config.wrapper_similarity))
            })
        })
        .collect();

    blocks
        .into_iter()
        .zip(keep)
        .filter_map(|(block, keep)| keep.then_some(block))
        .collect()
}

/// Keep blocks in order, skipping any whose content overlaps an accepted block:
/// contained in it, containing it, or similar above `near_duplicate_similarity`.
pub(crate) fn drop_near_duplicates(
    blocks: Vec<ContentBlock>,
    config: &SegmenterConfig,
) -> Vec<ContentBlock> {
    let mut accepted: Vec<ContentBlock> = Vec::with_capacity(blocks.len());

    for candidate in blocks {
        let duplicate = accepted.iter().any(|kept| {
            kept.content.contains(candidate.content.as_str())
                || candidate.content.contains(kept.content.as_str())
                || similar_above(
                    &candidate.content,
                    &kept.content,
                    config.near_duplicate_similarity,
                )
        });

        if duplicate {
            debug!("Dropping near-duplicate block '{}'", candidate.title);
        } else {
            accepted.push(candidate);
        }
    }

    accepted
}

//! Ambiguity-aware mismatch counting and tail alignment.

use crate::iupac::base_mask;

/// Count the positions where the two sequences hold incompatible symbols.
///
/// Two symbols are compatible when the base sets they represent intersect, so `N` is
/// compatible with every base and `R` (`A` or `G`) is compatible with `A` but not `C`.
/// Bytes outside the IUPAC alphabet are compatible with nothing.
///
/// The sequences must have the same length.
pub fn count_mismatches(a: &[u8], b: &[u8]) -> usize {
    debug_assert_eq!(a.len(), b.len(), "mismatch counting needs equal lengths");

    a.iter()
        .zip(b.iter())
        .filter(|&(&x, &y)| base_mask(x) & base_mask(y) == 0)
        .count()
}

/// Count mismatches between `pattern` and the start of `text`.
///
/// If `text` is shorter than `pattern`, every pattern position past the end of `text`
/// counts as a mismatch.
pub fn count_prefix_mismatches(pattern: &[u8], text: &[u8]) -> usize {
    let overlap = pattern.len().min(text.len());
    count_mismatches(&pattern[..overlap], &text[..overlap]) + (pattern.len() - overlap)
}

/// One alignment of a pattern prefix against the tail of a sequence.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TailMatch {
    /// Index in the sequence where the pattern starts.
    pub start: usize,
    /// Number of aligned symbols, at most the pattern length.
    pub overlap: usize,
    pub mismatches: usize,
}

/// Iterate over every alignment of `pattern` that covers the end of `sequence`,
/// from the full-length overlap down to a single symbol.
pub fn tail_alignments<'a>(
    sequence: &'a [u8],
    pattern: &'a [u8],
) -> impl Iterator<Item = TailMatch> + 'a {
    let n = sequence.len();
    let first = if pattern.is_empty() {
        n
    } else {
        n.saturating_sub(pattern.len())
    };

    (first..n).map(move |start| {
        let overlap = n - start;
        TailMatch {
            start,
            overlap,
            mismatches: count_mismatches(&sequence[start..], &pattern[..overlap]),
        }
    })
}

/// Find the tail alignment that trims the most of `sequence`.
///
/// An alignment qualifies when its mismatches fit within `threshold` scaled to the
/// overlap, so a full-length overlap may have up to `threshold` mismatches and a
/// truncated overlap gets a proportional share.
pub fn best_tail_match(sequence: &[u8], pattern: &[u8], threshold: usize) -> Option<TailMatch> {
    let m = pattern.len();

    tail_alignments(sequence, pattern)
        .find(|t| t.mismatches * m <= threshold.saturating_mul(t.overlap))
}

/// Where to cut `sequence` so that a trailing copy of `pattern` (or of its prefix) is
/// removed.
///
/// Returns `sequence.len()` when no tail alignment is within `threshold`, including
/// when `pattern` is empty.
pub fn candidate_trim_position(sequence: &[u8], pattern: &[u8], threshold: usize) -> usize {
    best_tail_match(sequence, pattern, threshold)
        .map(|t| t.start)
        .unwrap_or(sequence.len())
}

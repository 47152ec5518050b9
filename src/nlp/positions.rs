//! Translation between annotator token indices and token storage.
//!
//! Annotators number tokens from 1 while sentences store them in a 0-based
//! slice. All offset arithmetic lives here.

use crate::nlp::annotation::Token;

/// Token carrying the 1-based annotator `index`.
pub fn token_at(tokens: &[Token], index: usize) -> Option<&Token> {
    index.checked_sub(1).and_then(|offset| tokens.get(offset))
}

/// Slice of `tokens` between 0-based offsets `start..end`, clamped to the
/// sentence and empty when `start >= end`.
pub fn window(tokens: &[Token], start: usize, end: usize) -> &[Token] {
    let end = end.min(tokens.len());
    let start = start.min(end);
    &tokens[start..end]
}

/// Token interval strictly between two mentions: `(prot1 last index,
/// prot2 first index - 1)`.
///
/// Read as 0-based offsets, `start..end` selects exactly the tokens between
/// the mentions, because a 1-based index equals the 0-based offset of the
/// following token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BetweenRange {
    pub start: usize,
    pub end: usize,
}

impl BetweenRange {
    pub fn new(prot1_last: usize, prot2_first: usize) -> Self {
        Self {
            start: prot1_last,
            end: prot2_first.saturating_sub(1),
        }
    }

    /// Tokens strictly between the two mentions.
    pub fn tokens<'a>(&self, tokens: &'a [Token]) -> &'a [Token] {
        window(tokens, self.start, self.end)
    }

    /// The between-window widened by one token on each side, so it also
    /// covers the last token of prot1 and the first token of prot2.
    pub fn padded<'a>(&self, tokens: &'a [Token]) -> &'a [Token] {
        window(tokens, self.start.saturating_sub(1), self.end + 1)
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Value of a sorted list closest to `target`; ties go to the smaller value.
pub fn take_closest(sorted: &[usize], target: usize) -> Option<usize> {
    let pos = sorted.partition_point(|&value| value < target);
    if sorted.is_empty() {
        return None;
    }
    if pos == 0 {
        return Some(sorted[0]);
    }
    if pos == sorted.len() {
        return Some(sorted[sorted.len() - 1]);
    }
    let before = sorted[pos - 1];
    let after = sorted[pos];
    if after - target < target - before {
        Some(after)
    } else {
        Some(before)
    }
}

/// Endpoint of a sorted list farthest from `target`.
///
/// When both endpoints are equally far the first element is returned. That
/// tie-break is an arbitrary convention kept for feature compatibility; the
/// resulting distance is the same either way.
pub fn take_farthest(sorted: &[usize], target: usize) -> Option<usize> {
    let first = *sorted.first()?;
    let last = *sorted.last()?;
    if last.abs_diff(target) > first.abs_diff(target) {
        Some(last)
    } else {
        Some(first)
    }
}

/// Distances from `target` to the closest and farthest verb positions, or
/// `(0, 0)` when the scope holds no verb.
pub fn verb_distances(verb_positions: &[usize], target: usize) -> (usize, usize) {
    match (
        take_closest(verb_positions, target),
        take_farthest(verb_positions, target),
    ) {
        (Some(closest), Some(farthest)) => (closest.abs_diff(target), farthest.abs_diff(target)),
        _ => (0, 0),
    }
}

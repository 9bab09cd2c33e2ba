//! Cursor-to-page resolution and active-index clamping.

use crate::sync::scan::PageSpan;

/// Resolve a cursor offset to the index of the enclosing page record.
///
/// Both span ends are inclusive here (see [`PageSpan::contains`]); a cursor
/// between records, before the array, or past the last closed record gets
/// `None`, and callers must leave the active index unchanged on `None`.
/// An offset beyond the end of the text can never match, since no span ends
/// past the text it was scanned from.
pub fn page_at(spans: &[PageSpan], offset: usize) -> Option<usize> {
    spans.iter().position(|span| span.contains(offset))
}

/// Clamp an index into `[0, count-1]`, or to `0` when there are no pages.
///
/// `index` is signed so that stepping backwards from page 0 clamps instead
/// of wrapping. Total over all inputs and idempotent.
pub fn clamp_index(index: isize, count: usize) -> usize {
    if count == 0 {
        return 0;
    }
    index.clamp(0, count as isize - 1) as usize
}

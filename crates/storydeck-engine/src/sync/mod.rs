/*!
 * # Live Sync Module
 *
 * Keeps the preview's active page aligned with the edit cursor while the
 * raw deck JSON is being typed. The buffer is frequently *not* valid JSON
 * mid-keystroke, so nothing in this module parses the document; it only
 * needs to answer two questions cheaply and tolerantly:
 *
 * 1. Where are the closed top-level page records in the text right now?
 *    ([`scan`], a single-pass string/escape/brace-depth walk over the
 *    `"pages"` array, no syntax tree.)
 * 2. Which of those records is the cursor inside?
 *    ([`page_at`], the first span whose inclusive `[start, end]` interval
 *    contains the offset.)
 *
 * [`FollowSync`] coordinates those answers against a continuously mutating
 * buffer. Text edits and cursor motion each own one debounce deadline slot;
 * a new event of a kind replaces that kind's deadline and never touches the
 * other kind's. When a deadline fires, work always runs against the
 * *latest* text/cursor snapshot, never one captured at arm time, so a burst
 * of edits collapses into one scan of the final text.
 *
 * The published active index is clamped through [`clamp_index`] before
 * every write, so it stays in bounds even when an edit deletes pages out
 * from under it.
 *
 * All offsets are byte offsets into the UTF-8 text; the editing surface
 * owns any conversion from its native cursor representation.
 */

pub mod locate;
pub mod scan;
pub mod scheduler;

pub use locate::{clamp_index, page_at};
pub use scan::{PageSpan, scan, scan_array};
pub use scheduler::{Direction, FollowSync, SyncTiming};

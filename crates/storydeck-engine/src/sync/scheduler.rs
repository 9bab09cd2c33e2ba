//! # Dual-Trigger Scheduler
//!
//! Serializes two independent asynchronous event sources, text mutation
//! and cursor motion, into one coherent stream of active-page updates.
//! Each source owns exactly one debounce deadline slot; a new event of a
//! kind cancels and replaces that kind's deadline and never touches the
//! other kind's, so the two tracks cannot interfere with each other's
//! cancellation. Fired work always reads the latest text/cursor snapshot,
//! never one captured when the deadline was armed.
//!
//! Everything here runs on one logical thread: the owner feeds events in,
//! then calls [`FollowSync::poll`] from its event loop (sleeping until
//! [`FollowSync::next_deadline`] when idle). Replacing an `Option<Instant>`
//! slot is atomic with respect to that loop, and a replaced deadline has no
//! observable effect.

use std::time::{Duration, Instant};

use crate::sync::locate::{clamp_index, page_at};
use crate::sync::scan::{PageSpan, scan};

/// Quiescence windows for the two trigger kinds.
///
/// The cursor window is shorter than the edit window: cursor motion should
/// feel immediate, while re-scanning after edits can wait for the keystroke
/// burst to settle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncTiming {
    pub edit_quiesce: Duration,
    pub cursor_quiesce: Duration,
}

impl Default for SyncTiming {
    fn default() -> Self {
        Self {
            edit_quiesce: Duration::from_millis(300),
            cursor_quiesce: Duration::from_millis(120),
        }
    }
}

/// Manual navigation direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Prev,
    Next,
}

/// Live synchronization state between the edit buffer and the preview.
///
/// Owns the latest text and cursor snapshots, the page spans from the most
/// recent scan, the published active index, and the follow flag. The active
/// index is always clamped before publication, so it holds `0` for an empty
/// deck and stays in `[0, count-1]` otherwise, even when an edit deletes
/// pages out from under it.
#[derive(Debug)]
pub struct FollowSync {
    timing: SyncTiming,
    text: String,
    cursor: usize,
    spans: Vec<PageSpan>,
    active: usize,
    follow: bool,
    edit_deadline: Option<Instant>,
    cursor_deadline: Option<Instant>,
}

impl FollowSync {
    /// Create the sync state over an initial text snapshot.
    ///
    /// The initial scan runs synchronously; loading a document is not a
    /// keystroke and needs no debounce. Follow mode starts enabled.
    pub fn new(text: impl Into<String>, timing: SyncTiming) -> Self {
        let text = text.into();
        let spans = scan(&text);
        Self {
            timing,
            text,
            cursor: 0,
            spans,
            active: 0,
            follow: true,
            edit_deadline: None,
            cursor_deadline: None,
        }
    }

    /// The currently previewed page index.
    pub fn active_index(&self) -> usize {
        self.active
    }

    /// Whether the active index is tracking the cursor.
    pub fn follow(&self) -> bool {
        self.follow
    }

    /// Page spans from the most recent completed scan.
    pub fn spans(&self) -> &[PageSpan] {
        &self.spans
    }

    /// Latest text snapshot.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Latest cursor offset.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Record a buffer mutation and restart both debounce windows.
    ///
    /// The cursor window restarts too: typing moves the cursor, and the
    /// follow-up resolution must see the post-edit text.
    pub fn notify_text_changed(&mut self, text: impl Into<String>, now: Instant) {
        self.text = text.into();
        self.edit_deadline = Some(now + self.timing.edit_quiesce);
        self.cursor_deadline = Some(now + self.timing.cursor_quiesce);
    }

    /// Record cursor motion and restart the cursor debounce window only.
    pub fn notify_cursor_moved(&mut self, offset: usize, now: Instant) {
        self.cursor = offset;
        self.cursor_deadline = Some(now + self.timing.cursor_quiesce);
    }

    /// Fire any due deadline, at most once each. Returns `true` when the
    /// active index changed.
    ///
    /// Edit fire: re-scan the latest text and re-clamp the active index
    /// against the new page count, regardless of follow mode. Cursor fire:
    /// when follow mode is on, re-scan and resolve the latest cursor
    /// offset; an unresolvable offset (between records, outside the array)
    /// leaves the active index untouched.
    pub fn poll(&mut self, now: Instant) -> bool {
        let before = self.active;

        if self.edit_deadline.is_some_and(|at| at <= now) {
            self.edit_deadline = None;
            self.spans = scan(&self.text);
            self.active = clamp_index(self.active as isize, self.spans.len());
        }

        if self.cursor_deadline.is_some_and(|at| at <= now) {
            self.cursor_deadline = None;
            if self.follow {
                self.spans = scan(&self.text);
                if let Some(index) = page_at(&self.spans, self.cursor) {
                    self.active = clamp_index(index as isize, self.spans.len());
                }
            }
        }

        self.active != before
    }

    /// Earliest pending deadline, for event loops that sleep between events.
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.edit_deadline, self.cursor_deadline) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Step the active index one page in `direction`, synchronously.
    ///
    /// Manual navigation bypasses both debounce slots and suppresses
    /// cursor-follow in the same step; the preview stays where the author
    /// put it until [`FollowSync::set_follow`] re-enables tracking.
    pub fn navigate(&mut self, direction: Direction) -> usize {
        self.follow = false;
        let step = match direction {
            Direction::Prev => -1,
            Direction::Next => 1,
        };
        self.active = clamp_index(self.active as isize + step, self.spans.len());
        self.active
    }

    /// Enable or disable cursor-follow.
    ///
    /// Re-enabling immediately re-resolves the active index from the last
    /// known cursor offset against a fresh scan, rather than waiting for
    /// the next cursor event.
    pub fn set_follow(&mut self, follow: bool) {
        self.follow = follow;
        if follow {
            self.spans = scan(&self.text);
            if let Some(index) = page_at(&self.spans, self.cursor) {
                self.active = clamp_index(index as isize, self.spans.len());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::time::{Duration, Instant};

    const TWO_PAGES: &str = r#"{"data":{"pages":[{"id":"a"},{"id":"b"}]}}"#;
    const THREE_PAGES: &str = r#"{"data":{"pages":[{"id":"a"},{"id":"b"},{"id":"c"}]}}"#;

    fn timing() -> SyncTiming {
        SyncTiming::default()
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    // ============ Debounce tests ============

    #[test]
    fn test_edit_debounce_collapses_burst_to_one_scan_of_last_text() {
        let t0 = Instant::now();
        let mut sync = FollowSync::new("", timing());
        sync.set_follow(false);

        // Five rapid edits; only the last text may ever be scanned.
        for i in 0..5 {
            let partial = &TWO_PAGES[..TWO_PAGES.len() - 5 + i];
            sync.notify_text_changed(partial, t0 + ms(i as u64 * 10));
        }
        sync.notify_text_changed(TWO_PAGES, t0 + ms(50));

        // Still inside the quiescence window: nothing fired.
        assert!(!sync.poll(t0 + ms(200)));
        assert_eq!(sync.spans().len(), 0);

        // Window elapsed after the *last* edit: exactly one scan, of the
        // final text.
        sync.poll(t0 + ms(50) + timing().edit_quiesce);
        assert_eq!(sync.spans().len(), 2);
        assert_eq!(sync.next_deadline(), None);
    }

    #[test]
    fn test_cursor_debounce_resolves_latest_offset() {
        let t0 = Instant::now();
        let mut sync = FollowSync::new(TWO_PAGES, timing());

        sync.notify_cursor_moved(20, t0); // inside page 0
        sync.notify_cursor_moved(30, t0 + ms(10)); // inside page 1

        let changed = sync.poll(t0 + ms(10) + timing().cursor_quiesce);

        assert!(changed);
        assert_eq!(sync.active_index(), 1);
    }

    #[test]
    fn test_trigger_slots_do_not_cancel_each_other() {
        let t0 = Instant::now();
        let mut sync = FollowSync::new(TWO_PAGES, timing());

        sync.notify_text_changed(THREE_PAGES, t0);
        sync.notify_cursor_moved(30, t0 + ms(100));

        // Cursor slot fires first; the edit slot must still be pending at
        // its original deadline.
        sync.poll(t0 + ms(100) + timing().cursor_quiesce);
        assert_eq!(sync.next_deadline(), Some(t0 + timing().edit_quiesce));

        sync.poll(t0 + timing().edit_quiesce);
        assert_eq!(sync.next_deadline(), None);
        assert_eq!(sync.spans().len(), 3);
    }

    #[test]
    fn test_poll_without_pending_deadlines_is_inert() {
        let mut sync = FollowSync::new(TWO_PAGES, timing());

        assert!(!sync.poll(Instant::now() + ms(10_000)));
        assert_eq!(sync.active_index(), 0);
    }

    // ============ Resolution behavior tests ============

    #[test]
    fn test_cursor_between_records_leaves_active_unchanged() {
        let t0 = Instant::now();
        let text = r#"{"pages":[{"id":"a"} , {"id":"b"}]}"#;
        let mut sync = FollowSync::new(text, timing());

        sync.notify_cursor_moved(25, t0); // inside page 1
        sync.poll(t0 + timing().cursor_quiesce);
        assert_eq!(sync.active_index(), 1);

        // Offset 22 sits in the whitespace between the records: no flicker.
        sync.notify_cursor_moved(22, t0 + ms(500));
        let changed = sync.poll(t0 + ms(500) + timing().cursor_quiesce);

        assert!(!changed);
        assert_eq!(sync.active_index(), 1);
    }

    #[test]
    fn test_edit_fire_clamps_shrunken_count_regardless_of_follow() {
        let t0 = Instant::now();
        let mut sync = FollowSync::new(THREE_PAGES, timing());

        sync.navigate(Direction::Next);
        sync.navigate(Direction::Next);
        assert_eq!(sync.active_index(), 2);
        assert!(!sync.follow());

        // Edit removes two pages; the active index must re-enter bounds
        // even though follow is off.
        sync.notify_text_changed(r#"{"data":{"pages":[{"id":"a"}]}}"#, t0);
        let changed = sync.poll(t0 + timing().edit_quiesce);

        assert!(changed);
        assert_eq!(sync.active_index(), 0);
    }

    #[test]
    fn test_edit_to_empty_deck_stabilizes_to_zero() {
        let t0 = Instant::now();
        let mut sync = FollowSync::new(TWO_PAGES, timing());

        sync.notify_cursor_moved(30, t0);
        sync.poll(t0 + timing().cursor_quiesce);
        assert_eq!(sync.active_index(), 1);

        sync.notify_text_changed("", t0 + ms(500));
        sync.poll(t0 + ms(500) + timing().edit_quiesce);

        assert_eq!(sync.spans().len(), 0);
        assert_eq!(sync.active_index(), 0);
    }

    // ============ Follow mode tests ============

    #[test]
    fn test_navigate_suppresses_follow() {
        let t0 = Instant::now();
        let mut sync = FollowSync::new(TWO_PAGES, timing());

        assert_eq!(sync.navigate(Direction::Next), 1);
        assert!(!sync.follow());

        // Cursor motion back into page 0 must not move the preview.
        sync.notify_cursor_moved(20, t0);
        let changed = sync.poll(t0 + timing().cursor_quiesce);

        assert!(!changed);
        assert_eq!(sync.active_index(), 1);
    }

    #[test]
    fn test_navigate_clamps_at_both_ends() {
        let mut sync = FollowSync::new(TWO_PAGES, timing());

        assert_eq!(sync.navigate(Direction::Prev), 0);
        assert_eq!(sync.navigate(Direction::Next), 1);
        assert_eq!(sync.navigate(Direction::Next), 1);
    }

    #[test]
    fn test_navigate_on_empty_deck_stays_at_zero() {
        let mut sync = FollowSync::new("", timing());

        assert_eq!(sync.navigate(Direction::Next), 0);
        assert_eq!(sync.navigate(Direction::Prev), 0);
    }

    #[test]
    fn test_set_follow_true_re_resolves_immediately() {
        let t0 = Instant::now();
        let mut sync = FollowSync::new(TWO_PAGES, timing());

        sync.navigate(Direction::Next);
        sync.notify_cursor_moved(20, t0); // inside page 0
        sync.poll(t0 + timing().cursor_quiesce);
        assert_eq!(sync.active_index(), 1); // suppressed

        sync.set_follow(true);

        // No debounce wait: re-enabling resolves from the last cursor.
        assert_eq!(sync.active_index(), 0);
    }

    #[test]
    fn test_set_follow_true_with_unresolvable_cursor_keeps_index() {
        let mut sync = FollowSync::new(TWO_PAGES, timing());

        sync.navigate(Direction::Next);
        // Cursor at offset 0 sits before the array.
        sync.set_follow(true);

        assert_eq!(sync.active_index(), 1);
        assert!(sync.follow());
    }
}

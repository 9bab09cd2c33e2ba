//! # Boundary Scanner - Locating Page Records in Raw Text
//!
//! Finds the byte spans of the page records inside the `"pages"` array of a
//! deck document *without parsing it*. The buffer under the editor is
//! routinely invalid JSON (half-typed keys, unbalanced braces after a
//! deletion), and a strict parser would reject most intermediate states, so
//! this is deliberately a character-level state machine instead:
//!
//! - a quoted-string flag, so braces inside string values are inert;
//! - an escape flag, so `\"` does not close a string (and `\\"` does);
//! - a brace depth counter, so only depth-0 `{` / back-to-depth-0 `}`
//!   pairs delimit records.
//!
//! A record still being typed never closes and is simply not emitted; text
//! before the `"pages"` key is opaque; an unescaped `]` at depth 0 ends the
//! array and the scan. One pass, no allocation beyond the output vector.

/// Quoted key whose array holds the page records.
pub const PAGES_KEY: &str = "pages";

/// Byte span `[start, end)` of one closed top-level record in the deck text.
///
/// Spans are emitted in array order, never overlap, and satisfy
/// `start < end`. `end` is one past the record's closing brace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSpan {
    pub start: usize,
    pub end: usize,
}

impl PageSpan {
    /// Whether `offset` falls inside this span, inclusive on both ends.
    ///
    /// The inclusive end lets a cursor sitting just after the closing brace
    /// still count as "inside" the record it just finished.
    pub fn contains(&self, offset: usize) -> bool {
        offset >= self.start && offset <= self.end
    }
}

/// Scan `text` for closed page records in the first `"pages"` array.
pub fn scan(text: &str) -> Vec<PageSpan> {
    scan_array(text, PAGES_KEY)
}

/// Scan `text` for closed top-level records in the first array stored under
/// the quoted key `key`.
///
/// Returns an empty vector when the key or its opening `[` is absent; that
/// is the normal state while a document is being typed from scratch, not an
/// error.
pub fn scan_array(text: &str, key: &str) -> Vec<PageSpan> {
    let marker = format!("\"{key}\"");
    let Some(key_pos) = text.find(&marker) else {
        return Vec::new();
    };
    let after_key = key_pos + marker.len();
    let Some(bracket) = text[after_key..].find('[') else {
        return Vec::new();
    };
    let array_start = after_key + bracket + 1;

    let mut spans = Vec::new();
    let mut in_string = false;
    let mut escaped = false;
    let mut depth: usize = 0;
    let mut record_start: Option<usize> = None;

    for (i, c) in text[array_start..].char_indices() {
        let pos = array_start + i;
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => {
                if depth == 0 {
                    record_start = Some(pos);
                }
                depth += 1;
            }
            '}' => {
                if depth > 0 {
                    depth -= 1;
                    if depth == 0
                        && let Some(start) = record_start.take()
                    {
                        spans.push(PageSpan {
                            start,
                            end: pos + 1,
                        });
                    }
                }
            }
            // Unescaped `]` at depth 0 closes the target array.
            ']' if depth == 0 => break,
            _ => {}
        }
    }

    spans
}

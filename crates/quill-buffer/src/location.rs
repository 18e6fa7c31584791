//! Coordinate model: byte offset ↔ character offset ↔ visual column.
//!
//! Every position inside a line can be described three ways:
//!
//! | name      | unit             | used for                         |
//! |-----------|------------------|----------------------------------|
//! | `boffset` | bytes            | buffer mutation                  |
//! | `coffset` | characters       | logical cursor arithmetic        |
//! | `voffset` | terminal cells   | scrolling and rendering          |
//!
//! A tab advances to the next multiple of the tab width, every other
//! character takes exactly one cell.

use crate::action::Action;
use crate::cursor::Cursor;
use crate::line::{LineId, LineStore};

/// Tab width used when nothing else is configured.
pub const DEFAULT_TAB_WIDTH: usize = 8;

/// The three offsets of one position within a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Offsets {
    pub boffset: usize,
    pub coffset: usize,
    pub voffset: usize,
}

/// Decodes the first character of `data`.
///
/// Invalid sequences decode as U+FFFD with length 1, so every byte stays
/// reachable. Empty input yields length 0.
pub fn decode_rune(data: &[u8]) -> (char, usize) {
    let Some(&lead) = data.first() else {
        return (char::REPLACEMENT_CHARACTER, 0);
    };
    if lead.is_ascii() {
        return (lead as char, 1);
    }

    let width = match lead {
        0xC2..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF4 => 4,
        _ => return (char::REPLACEMENT_CHARACTER, 1),
    };
    data.get(..width)
        .and_then(|bytes| std::str::from_utf8(bytes).ok())
        .and_then(|s| s.chars().next())
        .map_or((char::REPLACEMENT_CHARACTER, 1), |r| (r, width))
}

/// Decodes the last character of `data`.
pub fn decode_last_rune(data: &[u8]) -> (char, usize) {
    if data.is_empty() {
        return (char::REPLACEMENT_CHARACTER, 0);
    }

    let end = data.len();
    let limit = end.saturating_sub(4);
    let mut start = end - 1;
    while start > limit && data[start] & 0xC0 == 0x80 {
        start -= 1;
    }

    let (r, len) = decode_rune(&data[start..]);
    if start + len == end {
        (r, len)
    } else {
        (char::REPLACEMENT_CHARACTER, 1)
    }
}

/// Number of cells `r` occupies when it starts at visual column `voffset`.
pub fn rune_advance(r: char, voffset: usize, tab_width: usize) -> usize {
    if r == '\t' {
        let tab_width = tab_width.max(1);
        tab_width - voffset % tab_width
    } else {
        1
    }
}

/// Finds the closest position not exceeding visual column `voffset`.
///
/// # Example
///
/// ```
/// use quill_buffer::find_closest_offsets;
///
/// // The tab spans columns 1..8, so column 5 snaps back to the `a`.
/// let offsets = find_closest_offsets(b"a\tb", 5, 8);
/// assert_eq!((offsets.boffset, offsets.coffset, offsets.voffset), (1, 1, 1));
/// ```
pub fn find_closest_offsets(data: &[u8], voffset: usize, tab_width: usize) -> Offsets {
    let mut offsets = Offsets::default();
    let mut rest = data;
    while !rest.is_empty() {
        let (r, rlen) = decode_rune(rest);
        rest = &rest[rlen..];

        let advance = rune_advance(r, offsets.voffset, tab_width);
        if offsets.voffset + advance > voffset {
            break;
        }

        offsets.boffset += rlen;
        offsets.coffset += 1;
        offsets.voffset += advance;
    }
    offsets
}

/// Computes `(voffset, coffset)` of byte offset `boffset` by walking the
/// line from its start.
pub fn voffset_coffset(data: &[u8], boffset: usize, tab_width: usize) -> (usize, usize) {
    let mut rest = &data[..boffset.min(data.len())];
    let (mut vo, mut co) = (0, 0);
    while !rest.is_empty() {
        let (r, rlen) = decode_rune(rest);
        rest = &rest[rlen..];
        co += 1;
        vo += rune_advance(r, vo, tab_width);
    }
    (vo, co)
}

/// Word characters are ASCII alphanumerics, `_` and anything outside ASCII.
pub fn is_word(r: char) -> bool {
    r == '_' || r.is_ascii_alphanumeric() || !r.is_ascii()
}

/// What happened to a view's top line because of an edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopLineChange {
    /// The edit did not touch anything above the top line.
    Unchanged,
    /// Lines were added or removed above; only the line number moved.
    Renumbered,
    /// The top line itself was removed and now points to another line.
    Repointed,
}

/// Where a view looks into a buffer: cursor, scroll anchor and the derived
/// offsets of the cursor.
///
/// Kept apart from the view itself because a buffer saves it when its last
/// view detaches, so the next attachment resumes the same position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewLocation {
    pub cursor: Cursor,
    pub top_line: LineId,
    pub top_line_num: usize,

    /// Cursor offset from the line start in characters.
    pub cursor_coffset: usize,
    /// Cursor offset from the line start in visual cells.
    pub cursor_voffset: usize,

    /// Visual cells skipped before the cursor line starts rendering.
    /// Recomputed when the cursor changes lines.
    pub line_voffset: usize,

    /// Column remembered for vertical movement across lines of different
    /// lengths.
    pub last_cursor_voffset: usize,
}

impl ViewLocation {
    /// Location at the very beginning of `lines`.
    pub fn at_start(lines: &LineStore) -> Self {
        Self {
            cursor: Cursor::new(lines.first(), 1, 0),
            top_line: lines.first(),
            top_line_num: 1,
            cursor_coffset: 0,
            cursor_voffset: 0,
            line_voffset: 0,
            last_cursor_voffset: 0,
        }
    }

    /// Keeps the top line number in sync after an insertion.
    pub fn on_insert_adjust_top(&mut self, action: &Action) -> TopLineChange {
        if action.cursor.line_num < self.top_line_num && !action.lines.is_empty() {
            self.top_line_num += action.lines.len();
            return TopLineChange::Renumbered;
        }
        TopLineChange::Unchanged
    }

    /// Keeps the top line valid after a deletion. Must be called after the
    /// lines were unlinked.
    pub fn on_delete_adjust_top(&mut self, action: &Action, lines: &LineStore) -> TopLineChange {
        if action.cursor.line_num >= self.top_line_num || action.lines.is_empty() {
            return TopLineChange::Unchanged;
        }

        let (first, last) = action.deleted_lines();
        if (first..=last).contains(&self.top_line_num) {
            match lines.next(action.cursor.line) {
                Some(next) => {
                    self.top_line = next;
                    self.top_line_num = action.cursor.line_num + 1;
                }
                None => {
                    self.top_line = action.cursor.line;
                    self.top_line_num = action.cursor.line_num;
                }
            }
            TopLineChange::Repointed
        } else {
            self.top_line_num -= action.lines.len();
            TopLineChange::Renumbered
        }
    }
}

//! Cursor locations and the motions defined on them.
//!
//! ## Learning: Back-References Without Borrowing
//!
//! A `Cursor` names its line by [`LineId`] rather than holding a `&Line`.
//! That keeps `Cursor` `Copy` and lets any number of them coexist with a
//! mutable buffer. The price is that every method needs the
//! [`LineStore`] passed in explicitly, which is also what makes it
//! obvious which buffer a cursor is being used against.

use crate::action::Action;
use crate::line::{LineId, LineStore};
use crate::location::{decode_last_rune, decode_rune, is_word, voffset_coffset};

/// A position in a buffer: line, its 1-based number, and byte offset.
///
/// The line number is kept in step with the line by every motion; it is
/// never recomputed by searching from the head.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cursor {
    pub line: LineId,
    pub line_num: usize,
    pub boffset: usize,
}

impl Cursor {
    pub fn new(line: LineId, line_num: usize, boffset: usize) -> Self {
        Self {
            line,
            line_num,
            boffset,
        }
    }

    /// At the beginning of the line?
    pub fn bol(&self) -> bool {
        self.boffset == 0
    }

    /// At the end of the line?
    pub fn eol(&self, lines: &LineStore) -> bool {
        self.boffset >= lines.data(self.line).len()
    }

    pub fn first_line(&self, lines: &LineStore) -> bool {
        lines.prev(self.line).is_none()
    }

    pub fn last_line(&self, lines: &LineStore) -> bool {
        lines.next(self.line).is_none()
    }

    /// The character under the cursor and its length in bytes.
    pub fn rune_under(&self, lines: &LineStore) -> (char, usize) {
        let data = lines.data(self.line);
        decode_rune(&data[self.boffset.min(data.len())..])
    }

    /// The character right before the cursor and its length in bytes.
    pub fn rune_before(&self, lines: &LineStore) -> (char, usize) {
        let data = lines.data(self.line);
        decode_last_rune(&data[..self.boffset.min(data.len())])
    }

    /// `(voffset, coffset)` of the cursor within its line.
    pub fn voffset_coffset(&self, lines: &LineStore, tab_width: usize) -> (usize, usize) {
        voffset_coffset(lines.data(self.line), self.boffset, tab_width)
    }

    pub fn voffset(&self, lines: &LineStore, tab_width: usize) -> usize {
        self.voffset_coffset(lines, tab_width).0
    }

    fn move_to_next_line(&mut self, lines: &LineStore) -> bool {
        match lines.next(self.line) {
            Some(next) => {
                self.line = next;
                self.line_num += 1;
                self.boffset = 0;
                true
            }
            None => false,
        }
    }

    fn move_to_prev_line_end(&mut self, lines: &LineStore) -> bool {
        match lines.prev(self.line) {
            Some(prev) => {
                self.line = prev;
                self.line_num -= 1;
                self.boffset = lines.data(prev).len();
                true
            }
            None => false,
        }
    }

    /// Moves one character forward; the line separator counts as one
    /// character. Returns `false` at the end of the buffer.
    pub fn move_one_rune_forward(&mut self, lines: &LineStore) -> bool {
        if self.eol(lines) {
            return self.move_to_next_line(lines);
        }
        let (_, rlen) = self.rune_under(lines);
        self.boffset += rlen;
        true
    }

    /// Moves one character backward. Returns `false` at the beginning of
    /// the buffer.
    pub fn move_one_rune_backward(&mut self, lines: &LineStore) -> bool {
        if self.bol() {
            return self.move_to_prev_line_end(lines);
        }
        let (_, rlen) = self.rune_before(lines);
        self.boffset -= rlen;
        true
    }

    pub fn move_beginning_of_line(&mut self) {
        self.boffset = 0;
    }

    pub fn move_end_of_line(&mut self, lines: &LineStore) {
        self.boffset = lines.data(self.line).len();
    }

    /// Skips any non-word run (crossing lines), then the following word.
    ///
    /// Returns `false` if the end of the buffer was reached before a word
    /// was found; the cursor is left wherever the scan stopped.
    pub fn move_one_word_forward(&mut self, lines: &LineStore) -> bool {
        loop {
            if self.eol(lines) {
                if !self.move_to_next_line(lines) {
                    return false;
                }
                continue;
            }
            let (r, rlen) = self.rune_under(lines);
            if is_word(r) {
                break;
            }
            self.boffset += rlen;
        }

        while !self.eol(lines) {
            let (r, rlen) = self.rune_under(lines);
            if !is_word(r) {
                break;
            }
            self.boffset += rlen;
        }
        true
    }

    /// Mirror image of [`Cursor::move_one_word_forward`].
    pub fn move_one_word_backward(&mut self, lines: &LineStore) -> bool {
        loop {
            if self.bol() {
                if !self.move_to_prev_line_end(lines) {
                    return false;
                }
                continue;
            }
            let (r, rlen) = self.rune_before(lines);
            if is_word(r) {
                break;
            }
            self.boffset -= rlen;
        }

        while !self.bol() {
            let (r, rlen) = self.rune_before(lines);
            if !is_word(r) {
                break;
            }
            self.boffset -= rlen;
        }
        true
    }

    /// Copies `n` bytes starting at the cursor, with `\n` between lines.
    /// Stops early at the end of the buffer.
    pub fn extract_bytes(&self, lines: &LineStore, mut n: usize) -> Vec<u8> {
        let mut out = Vec::with_capacity(n);
        let mut line = self.line;
        let mut offset = self.boffset;
        while n > 0 {
            let data = lines.data(line);
            if offset < data.len() {
                let take = n.min(data.len() - offset);
                out.extend_from_slice(&data[offset..offset + take]);
                n -= take;
                offset += take;
            } else {
                let Some(next) = lines.next(line) else {
                    break;
                };
                out.push(b'\n');
                n -= 1;
                line = next;
                offset = 0;
            }
        }
        out
    }

    /// Signed distance in bytes from `self` to `other`, line separators
    /// counting as one byte. Negative when `other` comes first.
    pub fn distance(&self, lines: &LineStore, other: &Cursor) -> isize {
        let (mut from, to, sign) = match self.line_num.cmp(&other.line_num) {
            std::cmp::Ordering::Equal => {
                return other.boffset as isize - self.boffset as isize;
            }
            std::cmp::Ordering::Less => (*self, *other, 1),
            std::cmp::Ordering::Greater => (*other, *self, -1),
        };

        let mut n = 0usize;
        while from.line != to.line {
            n += lines.data(from.line).len() - from.boffset + 1;
            match lines.next(from.line) {
                Some(next) => from.line = next,
                None => break,
            }
            from.boffset = 0;
        }
        n += to.boffset;
        sign * n as isize
    }

    /// Keeps the cursor pointing at the same text after `action` inserted
    /// data somewhere in the buffer.
    pub fn on_insert_adjust(&mut self, action: &Action) {
        let at = &action.cursor;
        if at.line_num > self.line_num {
            return;
        }
        if at.line_num < self.line_num {
            self.line_num += action.lines.len();
            return;
        }

        // same line: text at or after the insertion point moves along
        if at.boffset > self.boffset {
            return;
        }
        match action.lines.last() {
            None => self.boffset += action.data.len(),
            Some(&last) => {
                self.line = last;
                self.line_num += action.lines.len();
                self.boffset = action.last_line_affection_len() + (self.boffset - at.boffset);
            }
        }
    }

    /// Keeps the cursor on a live line after `action` deleted data. Must be
    /// called after the deleted lines were unlinked.
    pub fn on_delete_adjust(&mut self, action: &Action) {
        let at = &action.cursor;
        if at.line_num > self.line_num {
            return;
        }

        let removed = action.lines.len();
        if at.line_num < self.line_num {
            let (first, last) = action.deleted_lines();
            if removed == 0 || self.line_num > last {
                self.line_num -= removed;
                return;
            }
            debug_assert!(self.line_num >= first);

            // the cursor line is gone, its tail (if any) now follows `at`
            let tail = if self.line_num == last {
                self.boffset.saturating_sub(action.last_line_affection_len())
            } else {
                0
            };
            *self = *at;
            self.boffset += tail;
            return;
        }

        // same line
        if self.boffset <= at.boffset {
            return;
        }
        if removed == 0 {
            let end = at.boffset + action.data.len();
            self.boffset = if self.boffset >= end {
                self.boffset - action.data.len()
            } else {
                at.boffset
            };
        } else {
            self.boffset = at.boffset;
        }
    }
}

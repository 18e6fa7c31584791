//! Reversible edits.
//!
//! ## Learning: Recording Identity, Not Just Content
//!
//! An [`Action`] stores the bytes it inserted or removed *and* the ids of
//! every line it created or unlinked. Reverting a delete relinks those very
//! same line slots instead of allocating new ones, so a cursor, mark or
//! view that still names one of those lines is valid again afterwards.
//!
//! Applying and reverting go through `Buffer::perform`, which does the
//! splice, repairs the buffer's own cursors and then notifies an
//! [`EditObserver`] (in practice: every other view on the buffer).

use crate::buffer::Buffer;
use crate::cursor::Cursor;
use crate::line::{LineId, LineStore};

/// The direction of an edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Insert,
    Delete,
}

impl ActionKind {
    /// The kind that undoes this one.
    pub fn inverse(self) -> Self {
        match self {
            ActionKind::Insert => ActionKind::Delete,
            ActionKind::Delete => ActionKind::Insert,
        }
    }
}

/// One atomic edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    pub kind: ActionKind,
    /// Where the edit happened. For a delete this is the start of the range.
    pub cursor: Cursor,
    /// The exact bytes inserted or removed.
    pub data: Vec<u8>,
    /// Lines created by an insert or unlinked by a delete, in order.
    pub lines: Vec<LineId>,
}

impl Action {
    /// Prepares an insertion of `data` at `cursor`, allocating one fresh
    /// line per `\n` in the payload.
    pub fn insert(lines: &mut LineStore, cursor: Cursor, data: Vec<u8>) -> Self {
        let count = data.iter().filter(|&&b| b == b'\n').count();
        let new_lines = (0..count).map(|_| lines.alloc()).collect();
        Self {
            kind: ActionKind::Insert,
            cursor,
            data,
            lines: new_lines,
        }
    }

    /// Prepares a deletion of up to `n` bytes starting at `cursor`. The
    /// range is clipped at the end of the buffer.
    pub fn delete(lines: &LineStore, cursor: Cursor, n: usize) -> Self {
        let data = cursor.extract_bytes(lines, n);
        let count = data.iter().filter(|&&b| b == b'\n').count();

        let mut removed = Vec::with_capacity(count);
        let mut line = cursor.line;
        for _ in 0..count {
            match lines.next(line) {
                Some(next) => {
                    removed.push(next);
                    line = next;
                }
                None => break,
            }
        }

        Self {
            kind: ActionKind::Delete,
            cursor,
            data,
            lines: removed,
        }
    }

    /// Performs the action on `buffer`.
    pub fn apply(&self, buffer: &mut Buffer, observer: &mut dyn EditObserver) {
        buffer.perform(self, self.kind, observer);
    }

    /// Performs the inverse of the action on `buffer`.
    pub fn revert(&self, buffer: &mut Buffer, observer: &mut dyn EditObserver) {
        buffer.perform(self, self.kind.inverse(), observer);
    }

    /// Numbers of the first and last line removed by a delete (or created by
    /// an insert), as they were numbered while the lines were linked.
    pub fn deleted_lines(&self) -> (usize, usize) {
        let num = self.cursor.line_num;
        (num + 1, num + self.lines.len())
    }

    /// Bytes of the payload that land on the cursor line.
    pub fn first_line_affection_len(&self) -> usize {
        self.data
            .iter()
            .position(|&b| b == b'\n')
            .unwrap_or(self.data.len())
    }

    /// Bytes of the payload after its last `\n`.
    pub fn last_line_affection_len(&self) -> usize {
        match self.data.iter().rposition(|&b| b == b'\n') {
            Some(i) => self.data.len() - i - 1,
            None => self.data.len(),
        }
    }

    /// The position right after the payload, in the coordinates where the
    /// payload is present in the buffer.
    pub fn end_cursor(&self) -> Cursor {
        match self.lines.last() {
            None => Cursor::new(
                self.cursor.line,
                self.cursor.line_num,
                self.cursor.boffset + self.data.len(),
            ),
            Some(&last) => Cursor::new(
                last,
                self.cursor.line_num + self.lines.len(),
                self.last_line_affection_len(),
            ),
        }
    }

    /// Folds `next`, which was applied right after `self`, into `self` when
    /// the two describe one contiguous edit.
    pub fn try_merge(&mut self, next: &Action) -> bool {
        if self.kind != next.kind {
            return false;
        }

        match self.kind {
            ActionKind::Insert if next.cursor == self.end_cursor() => {
                self.data.extend_from_slice(&next.data);
                self.lines.extend_from_slice(&next.lines);
                true
            }
            // forward delete: the text after the first range slid under the cursor
            ActionKind::Delete if next.cursor == self.cursor => {
                self.data.extend_from_slice(&next.data);
                self.lines.extend_from_slice(&next.lines);
                true
            }
            // backward delete: the new range ends where the old one started
            ActionKind::Delete if next.end_cursor() == self.cursor => {
                let mut data = next.data.clone();
                data.extend_from_slice(&self.data);
                self.data = data;

                let mut lines = next.lines.clone();
                lines.extend_from_slice(&self.lines);
                self.lines = lines;

                self.cursor = next.cursor;
                true
            }
            _ => false,
        }
    }

    /// Splices the payload into or out of `lines`.
    pub(crate) fn splice(&self, lines: &mut LineStore, kind: ActionKind) {
        match kind {
            ActionKind::Insert => self.splice_in(lines),
            ActionKind::Delete => self.splice_out(lines),
        }
    }

    fn splice_in(&self, store: &mut LineStore) {
        let mut line = self.cursor.line;
        let mut offset = self.cursor.boffset;
        let mut tail = Vec::new();
        let mut new_lines = self.lines.iter().copied();

        for (i, chunk) in self.data.split(|&b| b == b'\n').enumerate() {
            if i > 0 {
                if i == 1 {
                    tail = store.data_mut(line).split_off(offset);
                }
                let Some(next) = new_lines.next() else {
                    break;
                };
                store.link_after(next, line);
                store.lines_n += 1;
                store.bytes_n += 1;
                line = next;
                offset = 0;
            }

            store
                .data_mut(line)
                .splice(offset..offset, chunk.iter().copied());
            offset += chunk.len();
            store.bytes_n += chunk.len();
        }

        store.data_mut(line).extend_from_slice(&tail);
    }

    fn splice_out(&self, store: &mut LineStore) {
        let line = self.cursor.line;
        let offset = self.cursor.boffset;
        let mut removed = self.lines.iter().copied();

        for (i, chunk) in self.data.split(|&b| b == b'\n').enumerate() {
            if i > 0 {
                let Some(next) = removed.next() else {
                    break;
                };
                let moved = std::mem::take(store.data_mut(next));
                store.data_mut(line).extend_from_slice(&moved);
                store.unlink(next);
                store.lines_n -= 1;
                store.bytes_n -= 1;
            }

            store.data_mut(line).drain(offset..offset + chunk.len());
            store.bytes_n -= chunk.len();
        }
    }
}

/// Receives every structural change made to a buffer.
///
/// `action.kind` describes the recorded edit; when an action is reverted the
/// effective change is the opposite one, which is why the two callbacks
/// exist instead of a single one switching on the kind.
pub trait EditObserver {
    fn on_insert(&mut self, _buffer: &Buffer, _action: &Action) {}

    fn on_delete(&mut self, _buffer: &Buffer, _action: &Action) {}
}

/// Nobody to notify.
impl EditObserver for () {}

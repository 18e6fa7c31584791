//! The line store: an arena of line records linked into a sequence.
//!
//! ## Learning: Arenas Instead of Pointers
//!
//! A doubly linked list of heap nodes with outside references into it
//! (cursors, the mark, undo actions, other views) is painful to express
//! with `Box` or `Rc<RefCell<_>>`. Instead every line lives in a `Vec`
//! and is addressed by a small copyable [`LineId`]. Unlinking a line
//! only rewires `prev`/`next`; the slot itself stays allocated, so an
//! undo action can splice the *same* line back in later and every id
//! that pointed at it becomes valid again.

use std::ops::Index;

/// Stable identifier of a line record inside a [`LineStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LineId(usize);

impl LineId {
    /// Returns the raw arena slot.
    pub fn index(self) -> usize {
        self.0
    }
}

/// A single line of raw bytes, without its trailing separator.
#[derive(Debug, Clone, Default)]
pub struct Line {
    pub(crate) data: Vec<u8>,
    prev: Option<LineId>,
    next: Option<LineId>,
}

impl Line {
    /// The line contents.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Length of the line in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn prev(&self) -> Option<LineId> {
        self.prev
    }

    pub fn next(&self) -> Option<LineId> {
        self.next
    }
}

/// Owns every line of a buffer and keeps the line/byte counters.
///
/// Invariant: there is always at least one linked line.
#[derive(Debug, Clone)]
pub struct LineStore {
    arena: Vec<Line>,
    first: LineId,
    last: LineId,
    pub(crate) lines_n: usize,
    pub(crate) bytes_n: usize,
}

impl LineStore {
    /// Creates a store holding a single empty line.
    pub fn new() -> Self {
        Self {
            arena: vec![Line::default()],
            first: LineId(0),
            last: LineId(0),
            lines_n: 1,
            bytes_n: 0,
        }
    }

    /// Builds a store from already split lines, linking them in order.
    pub fn from_lines(lines: Vec<Vec<u8>>) -> Self {
        if lines.is_empty() {
            return Self::new();
        }

        let count = lines.len();
        let mut bytes_n = count - 1;
        let arena: Vec<Line> = lines
            .into_iter()
            .enumerate()
            .map(|(i, data)| {
                bytes_n += data.len();
                Line {
                    data,
                    prev: i.checked_sub(1).map(LineId),
                    next: (i + 1 < count).then_some(LineId(i + 1)),
                }
            })
            .collect();

        Self {
            arena,
            first: LineId(0),
            last: LineId(count - 1),
            lines_n: count,
            bytes_n,
        }
    }

    /// First line of the sequence.
    pub fn first(&self) -> LineId {
        self.first
    }

    /// Last line of the sequence.
    pub fn last(&self) -> LineId {
        self.last
    }

    /// Number of linked lines.
    pub fn len_lines(&self) -> usize {
        self.lines_n
    }

    /// Number of content bytes, counting one byte per line separator.
    pub fn len_bytes(&self) -> usize {
        self.bytes_n
    }

    pub fn get(&self, id: LineId) -> &Line {
        &self.arena[id.0]
    }

    pub fn data(&self, id: LineId) -> &[u8] {
        &self.arena[id.0].data
    }

    pub fn next(&self, id: LineId) -> Option<LineId> {
        self.arena[id.0].next
    }

    pub fn prev(&self, id: LineId) -> Option<LineId> {
        self.arena[id.0].prev
    }

    /// Returns the line with the given 1-based number, walking from the head.
    pub fn nth(&self, line_num: usize) -> Option<LineId> {
        self.iter().nth(line_num.checked_sub(1)?)
    }

    /// Iterates over linked lines from first to last.
    pub fn iter(&self) -> LineIter<'_> {
        LineIter {
            store: self,
            current: Some(self.first),
        }
    }

    /// Allocates a fresh, unlinked, empty line.
    pub(crate) fn alloc(&mut self) -> LineId {
        self.arena.push(Line::default());
        LineId(self.arena.len() - 1)
    }

    pub(crate) fn data_mut(&mut self, id: LineId) -> &mut Vec<u8> {
        &mut self.arena[id.0].data
    }

    /// Links `line` right after `prev`.
    pub(crate) fn link_after(&mut self, line: LineId, prev: LineId) {
        let after = self.arena[prev.0].next;
        self.arena[prev.0].next = Some(line);
        self.arena[line.0].prev = Some(prev);
        self.arena[line.0].next = after;
        match after {
            Some(after) => self.arena[after.0].prev = Some(line),
            None => self.last = line,
        }
    }

    /// Unlinks `line` from the sequence and clears its contents. The slot
    /// stays allocated so the line can be linked again.
    pub(crate) fn unlink(&mut self, line: LineId) {
        let (prev, next) = (self.arena[line.0].prev, self.arena[line.0].next);
        match next {
            Some(next_id) => self.arena[next_id.0].prev = prev,
            None => {
                if let Some(prev) = prev {
                    self.last = prev;
                }
            }
        }
        match prev {
            Some(prev_id) => self.arena[prev_id.0].next = next,
            None => {
                if let Some(next) = next {
                    self.first = next;
                }
            }
        }
        let slot = &mut self.arena[line.0];
        slot.data.clear();
        slot.prev = None;
        slot.next = None;
    }
}

impl Default for LineStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Index<LineId> for LineStore {
    type Output = Line;

    fn index(&self, id: LineId) -> &Line {
        self.get(id)
    }
}

/// Iterator over linked lines, yielding ids in order.
pub struct LineIter<'a> {
    store: &'a LineStore,
    current: Option<LineId>,
}

impl Iterator for LineIter<'_> {
    type Item = LineId;

    fn next(&mut self) -> Option<LineId> {
        let id = self.current?;
        self.current = self.store.next(id);
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contents(store: &LineStore) -> Vec<Vec<u8>> {
        store.iter().map(|id| store.data(id).to_vec()).collect()
    }

    #[test]
    fn test_new_store_has_one_empty_line() {
        let store = LineStore::new();
        assert_eq!(store.len_lines(), 1);
        assert_eq!(store.len_bytes(), 0);
        assert_eq!(store.first(), store.last());
        assert!(store[store.first()].is_empty());
    }

    #[test]
    fn test_from_lines_counts() {
        let store = LineStore::from_lines(vec![b"ab".to_vec(), b"".to_vec(), b"c".to_vec()]);
        assert_eq!(store.len_lines(), 3);
        // 3 content bytes + 2 separators
        assert_eq!(store.len_bytes(), 5);
        assert_eq!(store.data(store.last()), b"c");
        assert_eq!(store.nth(2).map(|id| store.data(id)), Some(&b""[..]));
        assert_eq!(store.nth(4), None);
        assert_eq!(store.nth(0), None);
    }

    #[test]
    fn test_link_and_unlink_keep_slot() {
        let mut store = LineStore::from_lines(vec![b"a".to_vec(), b"c".to_vec()]);
        let first = store.first();
        let b = store.alloc();
        store.data_mut(b).extend_from_slice(b"b");
        store.link_after(b, first);
        assert_eq!(contents(&store), vec![b"a".to_vec(), b"b".to_vec(), b"c".to_vec()]);

        let last = store.last();
        store.unlink(last);
        assert_eq!(store.last(), b);
        assert!(store[last].is_empty());

        // The very same slot can be linked again.
        store.data_mut(last).extend_from_slice(b"c");
        store.link_after(last, b);
        assert_eq!(store.last(), last);
        assert_eq!(contents(&store), vec![b"a".to_vec(), b"b".to_vec(), b"c".to_vec()]);
    }
}

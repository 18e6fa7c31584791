//! The buffer: lines, history, mark and the views looking at it.
//!
//! ## Learning: One Writer, Many Observers
//!
//! Every change to the lines goes through `Buffer::perform`. It splices
//! the action, repairs the cursors the buffer itself holds (the mark and
//! the saved view location) and then hands `&Buffer` to an
//! [`EditObserver`]. Observers can read the new state but cannot mutate
//! it, so the buffer stays the single writer even with many views.

use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use uuid::Uuid;

use crate::action::{Action, ActionKind, EditObserver};
use crate::cursor::Cursor;
use crate::history::History;
use crate::line::{LineId, LineStore};
use crate::location::ViewLocation;
use crate::reader::BufferReader;
use crate::BufferResult;

/// Identifies a view attached to a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewId(Uuid);

impl ViewId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ViewId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A text buffer made of lines.
#[derive(Debug, Clone)]
pub struct Buffer {
    lines: LineStore,
    history: History,
    mark: Option<Cursor>,

    /// Where the last detached view left off.
    saved: ViewLocation,

    /// Views currently attached, in attachment order.
    views: Vec<ViewId>,

    name: String,
    path: Option<PathBuf>,
    modified: bool,
}

impl Buffer {
    /// Creates a buffer holding one empty line.
    ///
    /// # Example
    /// ```
    /// use quill_buffer::Buffer;
    ///
    /// let buffer = Buffer::new();
    /// assert_eq!(buffer.len_lines(), 1);
    /// assert_eq!(buffer.len_bytes(), 0);
    /// ```
    pub fn new() -> Self {
        Self::from_store(LineStore::new())
    }

    fn from_store(lines: LineStore) -> Self {
        let saved = ViewLocation::at_start(&lines);
        Self {
            history: History::new(saved.cursor),
            lines,
            mark: None,
            saved,
            views: Vec::new(),
            name: String::from("unnamed"),
            path: None,
            modified: false,
        }
    }

    /// Reads a buffer from a byte stream, splitting it on `\n`.
    ///
    /// The separator is not stored. Whatever follows the last separator
    /// becomes the last line, so `"a\n"` loads as two lines.
    pub fn from_reader(reader: impl Read) -> BufferResult<Self> {
        let mut reader = BufReader::new(reader);
        let mut lines = Vec::new();
        loop {
            let mut line = Vec::new();
            reader.read_until(b'\n', &mut line)?;
            if line.last() == Some(&b'\n') {
                line.pop();
                lines.push(line);
            } else {
                lines.push(line);
                break;
            }
        }
        Ok(Self::from_store(LineStore::from_lines(lines)))
    }

    /// Loads a file and remembers its path.
    pub fn from_file(path: impl AsRef<Path>) -> BufferResult<Self> {
        let path = path.as_ref();
        let mut buffer = Self::from_reader(File::open(path)?)?;
        if let Some(name) = path.file_name() {
            buffer.name = name.to_string_lossy().into_owned();
        }
        buffer.path = Some(path.to_path_buf());
        tracing::info!(
            path = %path.display(),
            lines = buffer.len_lines(),
            bytes = buffer.len_bytes(),
            "buffer loaded"
        );
        Ok(buffer)
    }

    /// Saves the buffer to `path` and remembers it.
    ///
    /// Writes to a uniquely named temporary file in the target's directory
    /// and renames it over the target, so a failed write never leaves a
    /// truncated file behind.
    pub fn save_to(&mut self, path: impl AsRef<Path>) -> BufferResult<()> {
        let path = path.as_ref();
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut temp = NamedTempFile::new_in(dir)?;
        self.write_to(&mut temp)?;
        temp.as_file().sync_all()?;
        temp.persist(path).map_err(|e| e.error)?;

        self.path = Some(path.to_path_buf());
        self.modified = false;
        tracing::info!(path = %path.display(), bytes = self.len_bytes(), "buffer saved");
        Ok(())
    }

    /// Copies the buffer contents into `writer`.
    pub fn write_to(&self, writer: &mut impl Write) -> BufferResult<u64> {
        Ok(io::copy(&mut self.reader(), writer)?)
    }

    /// A reader producing the buffer contents as one byte stream.
    pub fn reader(&self) -> BufferReader<'_> {
        BufferReader::new(&self.lines)
    }

    // ==================== Text Access ====================

    pub fn lines(&self) -> &LineStore {
        &self.lines
    }

    pub fn line_data(&self, line: LineId) -> &[u8] {
        self.lines.data(line)
    }

    /// The whole contents, decoded lossily.
    pub fn text(&self) -> String {
        let mut bytes = Vec::with_capacity(self.len_bytes());
        for (i, line) in self.lines.iter().enumerate() {
            if i > 0 {
                bytes.push(b'\n');
            }
            bytes.extend_from_slice(self.lines.data(line));
        }
        String::from_utf8_lossy(&bytes).into_owned()
    }

    #[inline]
    pub fn len_lines(&self) -> usize {
        self.lines.len_lines()
    }

    /// Number of bytes, line separators included.
    #[inline]
    pub fn len_bytes(&self) -> usize {
        self.lines.len_bytes()
    }

    pub fn start_cursor(&self) -> Cursor {
        Cursor::new(self.lines.first(), 1, 0)
    }

    pub fn end_cursor(&self) -> Cursor {
        let last = self.lines.last();
        Cursor::new(last, self.len_lines(), self.lines.data(last).len())
    }

    // ==================== Metadata ====================

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Changed since it was loaded or last saved?
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    // ==================== Mark ====================

    pub fn mark(&self) -> Option<Cursor> {
        self.mark
    }

    pub fn set_mark(&mut self, mark: Cursor) {
        self.mark = Some(mark);
    }

    pub fn clear_mark(&mut self) {
        self.mark = None;
    }

    pub fn is_mark_set(&self) -> bool {
        self.mark.is_some()
    }

    // ==================== Views ====================

    pub fn saved_location(&self) -> ViewLocation {
        self.saved
    }

    pub fn save_location(&mut self, loc: ViewLocation) {
        self.saved = loc;
    }

    /// Attached views.
    pub fn views(&self) -> &[ViewId] {
        &self.views
    }

    pub fn add_view(&mut self, view: ViewId) {
        if !self.views.contains(&view) {
            self.views.push(view);
        }
    }

    pub fn remove_view(&mut self, view: ViewId) {
        if let Some(pos) = self.views.iter().position(|&v| v == view) {
            self.views.swap_remove(pos);
        }
    }

    // ==================== Editing ====================

    /// Starts a new undo step if the previous one was finalized. `before`
    /// is where undo puts the cursor back.
    pub fn open_action_group(&mut self, before: Cursor) {
        self.history.open_group(before);
    }

    /// Closes the current undo step. `after` is where redo puts the cursor.
    pub fn finalize_action_group(&mut self, after: Cursor) {
        self.history.finalize(after);
    }

    /// Inserts `data` at `at` and records it. Returns the position right
    /// after the inserted text.
    pub fn insert(&mut self, at: Cursor, data: Vec<u8>, observer: &mut dyn EditObserver) -> Cursor {
        if data.is_empty() {
            return at;
        }
        self.open_if_sentinel(at);
        let action = Action::insert(&mut self.lines, at, data);
        action.apply(self, observer);
        let end = action.end_cursor();
        self.history.record(action);
        end
    }

    /// Deletes up to `n` bytes starting at `at` and records it. Returns the
    /// number of bytes actually removed.
    pub fn delete(&mut self, at: Cursor, n: usize, observer: &mut dyn EditObserver) -> usize {
        if n == 0 {
            return 0;
        }
        let action = Action::delete(&self.lines, at, n);
        let removed = action.data.len();
        if removed == 0 {
            return 0;
        }
        self.open_if_sentinel(at);
        action.apply(self, observer);
        self.history.record(action);
        removed
    }

    /// The sentinel never holds actions: an edit made without an open
    /// group gets one of its own.
    fn open_if_sentinel(&mut self, at: Cursor) {
        if self.history.current() == 0 {
            self.history.open_group(at);
        }
    }

    /// Reverts the current undo step. Returns the cursor recorded before
    /// it, or `None` when there is nothing to undo.
    pub fn undo(&mut self, cursor: Cursor, observer: &mut dyn EditObserver) -> Option<Cursor> {
        if !self.history.can_undo() {
            return None;
        }
        self.history.finalize(cursor);

        let actions = self.history.take_current();
        for action in actions.iter().rev() {
            action.revert(self, observer);
        }
        let before = self.history.step_back(actions);
        tracing::debug!(target: "quill::history", group = self.history.current(), "undo");
        Some(before)
    }

    /// Reapplies the next undo step. Returns the cursor recorded after it,
    /// or `None` when there is nothing to redo.
    pub fn redo(&mut self, observer: &mut dyn EditObserver) -> Option<Cursor> {
        if !self.history.can_redo() {
            return None;
        }

        let actions = self.history.step_forward();
        for action in &actions {
            action.apply(self, observer);
        }
        let after = self.history.put_current(actions);
        tracing::debug!(target: "quill::history", group = self.history.current(), "redo");
        Some(after)
    }

    /// Splices `action` as `kind`, repairs the mark and the saved location,
    /// then notifies `observer`.
    pub(crate) fn perform(&mut self, action: &Action, kind: ActionKind, observer: &mut dyn EditObserver) {
        action.splice(&mut self.lines, kind);
        self.modified = true;

        tracing::trace!(
            target: "quill::history",
            ?kind,
            line = action.cursor.line_num,
            boffset = action.cursor.boffset,
            bytes = action.data.len(),
            lines = action.lines.len(),
            "splice"
        );

        match kind {
            ActionKind::Insert => {
                if let Some(mark) = &mut self.mark {
                    mark.on_insert_adjust(action);
                }
                self.saved.cursor.on_insert_adjust(action);
                self.saved.on_insert_adjust_top(action);
                observer.on_insert(self, action);
            }
            ActionKind::Delete => {
                if let Some(mark) = &mut self.mark {
                    mark.on_delete_adjust(action);
                }
                self.saved.cursor.on_delete_adjust(action);
                self.saved.on_delete_adjust_top(action, &self.lines);
                observer.on_delete(self, action);
            }
        }
    }
}

impl Default for Buffer {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for Buffer {
    fn from(s: &str) -> Self {
        Self::from_store(LineStore::from_lines(
            s.split('\n').map(|line| line.as_bytes().to_vec()).collect(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn cursor_at(buffer: &Buffer, line_num: usize, boffset: usize) -> Cursor {
        Cursor::new(buffer.lines().nth(line_num).unwrap(), line_num, boffset)
    }

    fn contents(buffer: &Buffer) -> Vec<u8> {
        let mut out = Vec::new();
        buffer.write_to(&mut out).unwrap();
        out
    }

    #[test]
    fn test_load_splits_lines() {
        let buffer = Buffer::from_reader(&b"a\n"[..]).unwrap();
        assert_eq!(buffer.len_lines(), 2);
        assert_eq!(buffer.line_data(buffer.lines().last()), b"");

        let buffer = Buffer::from_reader(&b""[..]).unwrap();
        assert_eq!(buffer.len_lines(), 1);

        let buffer = Buffer::from_reader(&b"one\ntwo"[..]).unwrap();
        assert_eq!(buffer.len_lines(), 2);
        assert_eq!(buffer.len_bytes(), 7);
        assert_eq!(buffer.text(), "one\ntwo");
    }

    #[test]
    fn test_load_error_propagates() {
        struct Broken;
        impl Read for Broken {
            fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::other("disk on fire"))
            }
        }
        assert!(matches!(Buffer::from_reader(Broken), Err(crate::BufferError::Io(_))));
    }

    #[test]
    fn test_insert_delete_undo_redo() {
        let mut buffer = Buffer::from("hello");
        let start = cursor_at(&buffer, 1, 5);

        buffer.open_action_group(start);
        let end = buffer.insert(start, b" world\n!".to_vec(), &mut ());
        assert_eq!(buffer.text(), "hello world\n!");
        assert_eq!((end.line_num, end.boffset), (2, 1));
        buffer.finalize_action_group(end);

        let first = cursor_at(&buffer, 1, 0);
        buffer.open_action_group(first);
        assert_eq!(buffer.delete(first, 6, &mut ()), 6);
        assert_eq!(buffer.text(), "world\n!");

        assert_eq!(buffer.undo(first, &mut ()), Some(first));
        assert_eq!(buffer.text(), "hello world\n!");
        assert_eq!(buffer.undo(first, &mut ()), Some(start));
        assert_eq!(buffer.text(), "hello");
        assert_eq!(buffer.undo(start, &mut ()), None);

        assert_eq!(buffer.redo(&mut ()), Some(end));
        assert_eq!(buffer.text(), "hello world\n!");
        assert_eq!(buffer.redo(&mut ()), Some(first));
        assert_eq!(buffer.text(), "world\n!");
        assert_eq!(buffer.redo(&mut ()), None);
    }

    #[test]
    fn test_empty_edits_are_not_recorded() {
        let mut buffer = Buffer::from("abc");
        let end = buffer.end_cursor();
        buffer.open_action_group(end);
        assert_eq!(buffer.delete(end, 3, &mut ()), 0);
        buffer.insert(end, Vec::new(), &mut ());
        assert!(buffer.history().is_empty());
        assert!(!buffer.is_modified());
    }

    #[test]
    fn test_mark_follows_edits() {
        let mut buffer = Buffer::from("abc\ndef");
        buffer.set_mark(cursor_at(&buffer, 2, 1));

        let at = cursor_at(&buffer, 1, 1);
        buffer.open_action_group(at);
        buffer.insert(at, b"\n\n".to_vec(), &mut ());
        assert_eq!(buffer.mark().map(|m| (m.line_num, m.boffset)), Some((4, 1)));

        // joining the mark's line into the previous one moves it along
        let join = cursor_at(&buffer, 3, 2);
        buffer.delete(join, 1, &mut ());
        let mark = buffer.mark().unwrap();
        assert_eq!((mark.line_num, mark.boffset), (3, 3));
        assert_eq!(buffer.line_data(mark.line), b"bcdef");
    }

    #[test]
    fn test_saved_location_repointed() {
        let mut buffer = Buffer::from("a\nb\nc\nd");
        let mut loc = buffer.saved_location();
        loc.top_line = buffer.lines().nth(3).unwrap();
        loc.top_line_num = 3;
        loc.cursor = cursor_at(&buffer, 3, 0);
        buffer.save_location(loc);

        // delete "\nb\nc" from the end of line 1
        let at = cursor_at(&buffer, 1, 1);
        buffer.open_action_group(at);
        buffer.delete(at, 4, &mut ());
        assert_eq!(buffer.text(), "a\nd");

        let saved = buffer.saved_location();
        assert_eq!(saved.top_line_num, 2);
        assert_eq!(buffer.line_data(saved.top_line), b"d");
        assert_eq!((saved.cursor.line_num, saved.cursor.boffset), (1, 1));
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");

        let mut buffer = Buffer::from("first\nsecond\n");
        buffer.save_to(&path).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"first\nsecond\n");
        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);

        let loaded = Buffer::from_file(&path).unwrap();
        assert_eq!(loaded.name(), "notes.txt");
        assert_eq!(loaded.path(), Some(path.as_path()));
        assert_eq!(loaded.len_lines(), 3);
    }

    #[test]
    fn test_save_keeps_sibling_tmp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        let sibling = dir.path().join("notes.tmp");
        std::fs::write(&sibling, "precious").unwrap();

        let mut buffer = Buffer::from("hello");
        buffer.save_to(&path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "hello");
        assert_eq!(std::fs::read_to_string(&sibling).unwrap(), "precious");

        // saving over an existing file replaces it
        let mut buffer = Buffer::from("again");
        buffer.save_to(&path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "again");
    }

    #[test]
    fn test_edit_without_open_group_is_undoable() {
        let mut buffer = Buffer::from("a");
        let at = buffer.start_cursor();
        let end = buffer.insert(at, b"X".to_vec(), &mut ());
        assert_eq!(buffer.text(), "Xa");
        assert!(buffer.history().can_undo());
        assert_eq!(buffer.history().current_group().actions.len(), 1);

        assert_eq!(buffer.undo(end, &mut ()).map(|c| c.boffset), Some(0));
        assert_eq!(buffer.text(), "a");
        assert_eq!(buffer.history().current(), 0);
        assert!(buffer.history().current_group().actions.is_empty());
        assert!(buffer.history().can_redo());

        let at = buffer.start_cursor();
        assert_eq!(buffer.delete(at, 1, &mut ()), 1);
        assert_eq!(buffer.text(), "");
        assert!(buffer.undo(at, &mut ()).is_some());
        assert_eq!(buffer.text(), "a");
    }

    proptest! {
        #[test]
        fn prop_stream_round_trip(data in proptest::collection::vec(
            prop_oneof![Just(b'\n'), Just(b'\t'), any::<u8>()],
            0..200,
        )) {
            let buffer = Buffer::from_reader(&data[..]).unwrap();
            prop_assert_eq!(contents(&buffer), data.clone());
            prop_assert_eq!(buffer.len_bytes(), data.len());
        }

        #[test]
        fn prop_undo_redo_inverse(ops in proptest::collection::vec(
            (any::<bool>(), 0usize..40, "[a-c\n]{1,4}", 1usize..5),
            1..20,
        )) {
            let mut buffer = Buffer::from("alpha\nbeta\ngamma");
            let original = buffer.text();
            let mut cursor = buffer.start_cursor();
            let mut steps = 0;

            for (insert, pos, text, n) in ops {
                let mut at = buffer.start_cursor();
                for _ in 0..pos {
                    at.move_one_rune_forward(buffer.lines());
                }
                if !insert && at == buffer.end_cursor() {
                    continue;
                }
                buffer.finalize_action_group(cursor);
                buffer.open_action_group(cursor);
                if insert {
                    cursor = buffer.insert(at, text.into_bytes(), &mut ());
                } else {
                    prop_assert!(buffer.delete(at, n, &mut ()) > 0);
                    cursor = at;
                }
                steps += 1;
            }

            let edited = buffer.text();
            let last = cursor;
            for _ in 0..steps {
                cursor = buffer.undo(cursor, &mut ()).unwrap();
            }
            prop_assert_eq!(buffer.text(), original);
            prop_assert_eq!(cursor, buffer.start_cursor());
            prop_assert!(buffer.undo(cursor, &mut ()).is_none());

            for _ in 0..steps {
                cursor = buffer.redo(&mut ()).unwrap();
            }
            prop_assert_eq!(buffer.text(), edited);
            prop_assert_eq!(cursor, last);
        }
    }
}

//! Editing through a view.
//!
//! Every edit goes through `action_insert` or
//! `action_delete`: they open an undo step if needed and route the
//! buffer's notifications to this view's top line and to the peers. An
//! edit that changes nothing opens no step.

use std::cmp::Ordering;

use quill_buffer::{Buffer, Cursor};

use super::sync::Broadcast;
use super::{Dirty, View, ViewContext};
use crate::autocomplete::Autocomplete;

impl View {
    fn action_insert(&mut self, ctx: &mut ViewContext<'_>, at: Cursor, data: Vec<u8>) -> Cursor {
        if data.is_empty() {
            return at;
        }
        ctx.buffer.open_action_group(self.loc.cursor);
        let mut observer = Broadcast::new(&mut self.loc, &mut *ctx.peers);
        ctx.buffer.insert(at, data, &mut observer)
    }

    fn action_delete(&mut self, ctx: &mut ViewContext<'_>, at: Cursor, n: usize) -> usize {
        if n == 0 {
            return 0;
        }
        ctx.buffer.open_action_group(self.loc.cursor);
        let mut observer = Broadcast::new(&mut self.loc, &mut *ctx.peers);
        ctx.buffer.delete(at, n, &mut observer)
    }

    /// Inserts `r` at the cursor and moves past it.
    pub fn insert_rune(&mut self, ctx: &mut ViewContext<'_>, r: char) {
        let mut encoded = [0u8; 4];
        let data = r.encode_utf8(&mut encoded).as_bytes().to_vec();
        let end = self.action_insert(ctx, self.loc.cursor, data);
        self.move_cursor_to(ctx.buffer, end);
        self.dirty = Dirty::EVERYTHING;
    }

    /// Deletes the character before the cursor, joining lines at the start
    /// of a line.
    pub fn delete_rune_backward(&mut self, ctx: &mut ViewContext<'_>) {
        let lines = ctx.buffer.lines();
        let c = self.loc.cursor;
        let (at, n) = if c.bol() {
            let Some(prev) = lines.prev(c.line) else {
                ctx.status.set_status("Beginning of buffer");
                return;
            };
            (Cursor::new(prev, c.line_num - 1, lines.data(prev).len()), 1)
        } else {
            let (_, rlen) = c.rune_before(lines);
            (Cursor::new(c.line, c.line_num, c.boffset - rlen), rlen)
        };
        self.action_delete(ctx, at, n);
        self.move_cursor_to(ctx.buffer, at);
        self.dirty = Dirty::EVERYTHING;
    }

    /// Deletes the character under the cursor, joining lines at the end of
    /// a line.
    pub fn delete_rune(&mut self, ctx: &mut ViewContext<'_>) {
        let lines = ctx.buffer.lines();
        let c = self.loc.cursor;
        let n = if c.eol(lines) {
            if c.last_line(lines) {
                ctx.status.set_status("End of buffer");
                return;
            }
            1
        } else {
            c.rune_under(lines).1
        };
        self.action_delete(ctx, c, n);
        self.dirty = Dirty::EVERYTHING;
    }

    /// Deletes up to the end of the line, or the line separator when
    /// already there.
    pub fn kill_line(&mut self, ctx: &mut ViewContext<'_>) {
        let c = self.loc.cursor;
        if c.eol(ctx.buffer.lines()) {
            self.delete_rune(ctx);
            return;
        }
        let n = ctx.buffer.line_data(c.line).len() - c.boffset;
        self.action_delete(ctx, c, n);
        self.dirty = Dirty::EVERYTHING;
    }

    /// Deletes up to the end of the next word.
    pub fn kill_word(&mut self, ctx: &mut ViewContext<'_>) {
        let lines = ctx.buffer.lines();
        let c = self.loc.cursor;
        let mut end = c;
        end.move_one_word_forward(lines);
        let d = c.distance(lines, &end);
        if d > 0 {
            self.action_delete(ctx, c, d as usize);
            self.dirty = Dirty::EVERYTHING;
        }
    }

    /// Deletes the text between the mark and the cursor. The cursor ends
    /// up where the region started.
    pub fn kill_region(&mut self, ctx: &mut ViewContext<'_>) {
        let Some(mark) = ctx.buffer.mark() else {
            ctx.status.set_status("The mark is not set now, so there is no region");
            return;
        };

        let c = self.loc.cursor;
        let d = c.distance(ctx.buffer.lines(), &mark);
        match d.cmp(&0) {
            Ordering::Equal => return,
            Ordering::Less => {
                self.action_delete(ctx, mark, d.unsigned_abs());
                self.move_cursor_to(ctx.buffer, mark);
            }
            Ordering::Greater => {
                self.action_delete(ctx, c, d as usize);
            }
        }
        self.dirty = Dirty::EVERYTHING;
    }

    pub fn set_mark(&mut self, ctx: &mut ViewContext<'_>) {
        ctx.buffer.set_mark(self.loc.cursor);
        ctx.status.set_status("Mark set");
    }

    pub fn swap_cursor_and_mark(&mut self, buffer: &mut Buffer) {
        if let Some(mark) = buffer.mark() {
            buffer.set_mark(self.loc.cursor);
            self.move_cursor_to(buffer, mark);
        }
    }

    // ==================== History ====================

    pub fn undo(&mut self, ctx: &mut ViewContext<'_>) {
        let cursor = self.loc.cursor;
        let mut observer = Broadcast::new(&mut self.loc, &mut *ctx.peers);
        let Some(before) = ctx.buffer.undo(cursor, &mut observer) else {
            return;
        };
        self.move_cursor_to(ctx.buffer, before);
        self.loc.last_cursor_voffset = self.loc.cursor_voffset;
        self.dirty = Dirty::EVERYTHING;
    }

    pub fn redo(&mut self, ctx: &mut ViewContext<'_>) {
        let mut observer = Broadcast::new(&mut self.loc, &mut *ctx.peers);
        let Some(after) = ctx.buffer.redo(&mut observer) else {
            return;
        };
        self.move_cursor_to(ctx.buffer, after);
        self.loc.last_cursor_voffset = self.loc.cursor_voffset;
        self.dirty = Dirty::EVERYTHING;
    }

    // ==================== Autocompletion ====================

    pub fn autocomplete_init(&mut self, ctx: &mut ViewContext<'_>) {
        let Some(source) = ctx.completion else {
            tracing::debug!(target: "quill::view", "no completion source");
            return;
        };
        self.autocomplete = match source.start(ctx.buffer, self.loc.cursor) {
            Some(session) => Autocomplete::Active(session),
            None => Autocomplete::Inactive,
        };
        self.dirty = Dirty::EVERYTHING;
    }

    pub fn autocomplete_move_cursor_up(&mut self) {
        if let Some(session) = self.autocomplete.session_mut() {
            session.move_selection_up();
            self.dirty = Dirty::EVERYTHING;
        }
    }

    pub fn autocomplete_move_cursor_down(&mut self) {
        if let Some(session) = self.autocomplete.session_mut() {
            session.move_selection_down();
            self.dirty = Dirty::EVERYTHING;
        }
    }

    /// Replaces the typed prefix with the selected proposal and ends the
    /// session.
    pub fn autocomplete_finalize(&mut self, ctx: &mut ViewContext<'_>) {
        let Some(session) = self.autocomplete.take() else {
            return;
        };
        let c = self.loc.cursor;
        let Some(completion) = session.finalize(ctx.buffer, c) else {
            return;
        };

        let start = Cursor::new(c.line, c.line_num, completion.start.min(c.boffset));
        let typed = c.boffset - start.boffset;
        if typed > 0 {
            self.action_delete(ctx, start, typed);
        }
        let end = self.action_insert(ctx, start, completion.text.into_bytes());
        self.move_cursor_to(ctx.buffer, end);
        self.dirty = Dirty::EVERYTHING;
    }
}

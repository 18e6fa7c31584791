//! Cursor motion.
//!
//! Every motion computes a target and commits it through
//! [`View::move_cursor_to`], which is the only place that recomputes the
//! cursor offsets, pans, scrolls and feeds the completion session.

use quill_buffer::{find_closest_offsets, voffset_coffset, Buffer, Cursor, LineId};

use super::{Dirty, View, ViewContext};

impl View {
    /// Commits `c` as the new cursor.
    pub fn move_cursor_to(&mut self, buffer: &Buffer, c: Cursor) {
        self.commit(buffer, c.line, c.line_num, Some(c.boffset));
    }

    /// Commits a cursor on `line`, snapped to the remembered visual column.
    pub fn move_cursor_to_line(&mut self, buffer: &Buffer, line: LineId, line_num: usize) {
        self.commit(buffer, line, line_num, None);
    }

    fn commit(&mut self, buffer: &Buffer, line: LineId, line_num: usize, boffset: Option<usize>) {
        self.dirty |= Dirty::STATUS;

        let data = buffer.line_data(line);
        let tab_width = self.config.tab_width;
        let boffset = match boffset {
            Some(boffset) => {
                let (vo, co) = voffset_coffset(data, boffset, tab_width);
                self.loc.cursor_voffset = vo;
                self.loc.cursor_coffset = co;
                boffset
            }
            None => {
                let o = find_closest_offsets(data, self.loc.last_cursor_voffset, tab_width);
                self.loc.cursor_voffset = o.voffset;
                self.loc.cursor_coffset = o.coffset;
                o.boffset
            }
        };

        if line == self.loc.cursor.line {
            self.loc.last_cursor_voffset = self.loc.cursor_voffset;
        } else if self.loc.line_voffset != 0 {
            // the line we leave is drawn unpanned again
            self.loc.line_voffset = 0;
            self.dirty = Dirty::EVERYTHING;
        }
        self.loc.cursor = Cursor::new(line, line_num, boffset);

        self.adjust_line_voffset();
        self.adjust_top_line(buffer.lines());
        self.autocomplete.update(buffer, self.loc.cursor);
    }

    pub fn move_cursor_forward(&mut self, ctx: &mut ViewContext<'_>) {
        let lines = ctx.buffer.lines();
        let mut c = self.loc.cursor;
        if c.last_line(lines) && c.eol(lines) {
            ctx.status.set_status("End of buffer");
            return;
        }
        c.move_one_rune_forward(lines);
        self.move_cursor_to(ctx.buffer, c);
    }

    pub fn move_cursor_backward(&mut self, ctx: &mut ViewContext<'_>) {
        let lines = ctx.buffer.lines();
        let mut c = self.loc.cursor;
        if c.first_line(lines) && c.bol() {
            ctx.status.set_status("Beginning of buffer");
            return;
        }
        c.move_one_rune_backward(lines);
        self.move_cursor_to(ctx.buffer, c);
    }

    /// Moves past the next word. At the end of the buffer the cursor
    /// still moves as far as it got.
    pub fn move_cursor_word_forward(&mut self, ctx: &mut ViewContext<'_>) {
        let mut c = self.loc.cursor;
        let ok = c.move_one_word_forward(ctx.buffer.lines());
        self.move_cursor_to(ctx.buffer, c);
        if !ok {
            ctx.status.set_status("End of buffer");
        }
    }

    pub fn move_cursor_word_backward(&mut self, ctx: &mut ViewContext<'_>) {
        let mut c = self.loc.cursor;
        let ok = c.move_one_word_backward(ctx.buffer.lines());
        self.move_cursor_to(ctx.buffer, c);
        if !ok {
            ctx.status.set_status("Beginning of buffer");
        }
    }

    pub fn move_cursor_next_line(&mut self, ctx: &mut ViewContext<'_>) {
        let c = self.loc.cursor;
        match ctx.buffer.lines().next(c.line) {
            Some(next) => self.move_cursor_to_line(ctx.buffer, next, c.line_num + 1),
            None => ctx.status.set_status("End of buffer"),
        }
    }

    pub fn move_cursor_prev_line(&mut self, ctx: &mut ViewContext<'_>) {
        let c = self.loc.cursor;
        match ctx.buffer.lines().prev(c.line) {
            Some(prev) => self.move_cursor_to_line(ctx.buffer, prev, c.line_num - 1),
            None => ctx.status.set_status("Beginning of buffer"),
        }
    }

    pub fn move_cursor_beginning_of_line(&mut self, buffer: &Buffer) {
        let mut c = self.loc.cursor;
        c.move_beginning_of_line();
        self.move_cursor_to(buffer, c);
    }

    pub fn move_cursor_end_of_line(&mut self, buffer: &Buffer) {
        let mut c = self.loc.cursor;
        c.move_end_of_line(buffer.lines());
        self.move_cursor_to(buffer, c);
    }

    pub fn move_cursor_beginning_of_file(&mut self, buffer: &Buffer) {
        self.move_cursor_to(buffer, buffer.start_cursor());
    }

    pub fn move_cursor_end_of_file(&mut self, buffer: &Buffer) {
        self.move_cursor_to(buffer, buffer.end_cursor());
    }
}

#[cfg(test)]
mod tests {
    use crate::command::Command;
    use crate::view::tests::Fixture;

    #[test]
    fn test_forward_backward_boundaries() {
        let mut f = Fixture::new("ab\nc", 80, 10);
        f.run(Command::MoveCursorBackward);
        assert_eq!(f.status.last(), Some("Beginning of buffer"));
        assert_eq!(f.cursor(), (1, 0));

        f.run_n(Command::MoveCursorForward, 3);
        assert_eq!(f.cursor(), (2, 0));
        f.run(Command::MoveCursorForward);
        assert_eq!(f.cursor(), (2, 1));
        f.run(Command::MoveCursorForward);
        assert_eq!(f.status.last(), Some("End of buffer"));
        assert_eq!(f.cursor(), (2, 1));

        f.run(Command::MoveCursorBackward);
        f.run(Command::MoveCursorBackward);
        assert_eq!(f.cursor(), (1, 2));
    }

    #[test]
    fn test_vertical_motion_remembers_column() {
        let mut f = Fixture::new("long line\nab\nanother line", 80, 10);
        f.run(Command::MoveCursorEndOfLine);
        assert_eq!(f.cursor(), (1, 9));

        f.run(Command::MoveCursorNextLine);
        assert_eq!(f.cursor(), (2, 2));
        f.run(Command::MoveCursorNextLine);
        assert_eq!(f.cursor(), (3, 9));
        f.run(Command::MoveCursorPrevLine);
        f.run(Command::MoveCursorPrevLine);
        assert_eq!(f.cursor(), (1, 9));
    }

    #[test]
    fn test_vertical_motion_across_tabs() {
        let mut f = Fixture::new("a\tb\n0123456789", 80, 10);
        f.run(Command::MoveCursorNextLine);
        f.run_n(Command::MoveCursorForward, 5);
        f.run(Command::MoveCursorBeginningOfLine);
        f.run_n(Command::MoveCursorForward, 5);
        assert_eq!(f.view.location().last_cursor_voffset, 5);

        f.run(Command::MoveCursorPrevLine);
        // column 5 falls inside the tab, so the cursor stays before it
        assert_eq!(f.cursor(), (1, 1));
        assert_eq!(f.view.location().cursor_voffset, 1);
        assert_eq!(f.view.location().cursor_coffset, 1);
    }

    #[test]
    fn test_vertical_motion_at_edges_reports() {
        let mut f = Fixture::new("only", 80, 10);
        f.run(Command::MoveCursorEndOfLine);
        f.run(Command::MoveCursorNextLine);
        assert_eq!(f.status.last(), Some("End of buffer"));
        f.run(Command::MoveCursorPrevLine);
        assert_eq!(f.status.last(), Some("Beginning of buffer"));
        assert_eq!(f.cursor(), (1, 4));
    }

    #[test]
    fn test_word_forward_at_buffer_end() {
        let mut f = Fixture::new("foo bar", 80, 10);
        f.run(Command::MoveCursorWordForward);
        assert_eq!(f.cursor(), (1, 3));
        f.run(Command::MoveCursorWordForward);
        assert_eq!(f.cursor(), (1, 7));
        assert!(f.status.messages().is_empty());

        f.run(Command::MoveCursorWordForward);
        assert_eq!(f.cursor(), (1, 7));
        assert_eq!(f.status.last(), Some("End of buffer"));
    }

    #[test]
    fn test_word_backward_reports_start() {
        let mut f = Fixture::new("  foo", 80, 10);
        f.run(Command::MoveCursorEndOfLine);
        f.run(Command::MoveCursorWordBackward);
        assert_eq!(f.cursor(), (1, 2));
        f.run(Command::MoveCursorWordBackward);
        assert_eq!(f.cursor(), (1, 0));
        assert_eq!(f.status.last(), Some("Beginning of buffer"));
    }

    #[test]
    fn test_file_motions() {
        let mut f = Fixture::new("a\nbb\nccc", 80, 10);
        f.run(Command::MoveCursorEndOfFile);
        assert_eq!(f.cursor(), (3, 3));
        f.run(Command::MoveCursorBeginningOfFile);
        assert_eq!(f.cursor(), (1, 0));
    }
}

//! Vertical scrolling and horizontal panning.
//!
//! Two complementary corrections keep the cursor row inside the margins:
//! after the cursor moves, `adjust_top_line` scrolls; after the
//! view scrolls, `adjust_cursor_line` drags the cursor along.

use quill_buffer::{find_closest_offsets, Buffer, LineId, LineStore};

use super::{Dirty, View};

/// Walks up to `n` lines from `line` (backwards when `n` is negative).
/// Returns where it stopped and how many lines it actually moved.
fn walk(lines: &LineStore, mut line: LineId, n: isize) -> (LineId, isize) {
    let mut moved = 0;
    while moved != n {
        let step = if n > 0 { lines.next(line) } else { lines.prev(line) };
        match step {
            Some(to) => {
                line = to;
                moved += n.signum();
            }
            None => break,
        }
    }
    (line, moved)
}

fn offset_line_num(line_num: usize, moved: isize) -> usize {
    (line_num as isize + moved) as usize
}

impl View {
    pub(super) fn move_top_line_n_times(&mut self, lines: &LineStore, n: isize) {
        let (top, moved) = walk(lines, self.loc.top_line, n);
        self.loc.top_line = top;
        self.loc.top_line_num = offset_line_num(self.loc.top_line_num, moved);
    }

    pub(super) fn move_cursor_line_n_times(&mut self, lines: &LineStore, n: isize) {
        let (line, moved) = walk(lines, self.loc.cursor.line, n);
        self.loc.cursor.line = line;
        self.loc.cursor.line_num = offset_line_num(self.loc.cursor.line_num, moved);
    }

    /// Whether the top line can move exactly `n` lines.
    pub fn can_move_top_line_n_times(&self, lines: &LineStore, n: isize) -> bool {
        walk(lines, self.loc.top_line, n).1 == n
    }

    /// Scrolls the top line so the cursor row is inside the vertical margins.
    pub(super) fn adjust_top_line(&mut self, lines: &LineStore) {
        let vt = self.vertical_threshold();
        let top = self.loc.top_line;
        let co = self.loc.cursor.line_num as isize - self.loc.top_line_num as isize;
        let h = self.height() as isize;

        if lines.next(top).is_some() && co >= h - vt {
            self.move_top_line_n_times(lines, co - (h - vt) + 1);
            self.dirty = Dirty::EVERYTHING;
        }

        if lines.prev(top).is_some() && co < vt {
            self.move_top_line_n_times(lines, co - vt);
            self.dirty = Dirty::EVERYTHING;
        }
    }

    /// Drags the cursor along after the top line moved, keeping the
    /// remembered visual column.
    pub(super) fn adjust_cursor_line(&mut self, buffer: &Buffer) {
        let lines = buffer.lines();
        let vt = self.vertical_threshold();
        let cursor = self.loc.cursor.line;
        let co = self.loc.cursor.line_num as isize - self.loc.top_line_num as isize;
        let h = self.height() as isize;

        if lines.next(cursor).is_some() && co < vt {
            self.move_cursor_line_n_times(lines, vt - co);
        }

        if lines.prev(cursor).is_some() && co >= h - vt {
            self.move_cursor_line_n_times(lines, (h - vt) - co - 1);
        }

        if cursor != self.loc.cursor.line {
            let data = lines.data(self.loc.cursor.line);
            let o = find_closest_offsets(data, self.loc.last_cursor_voffset, self.config.tab_width);
            self.loc.cursor.boffset = o.boffset;
            self.loc.cursor_coffset = o.coffset;
            self.loc.cursor_voffset = o.voffset;
            self.loc.line_voffset = 0;
            self.adjust_line_voffset();
            self.dirty = Dirty::EVERYTHING;
        }
    }

    /// Pans the cursor line so the cursor column stays inside the
    /// horizontal margins. Once panned, one column on the right is left for
    /// the continuation mark.
    pub(super) fn adjust_line_voffset(&mut self) {
        let ht = self.horizontal_threshold();
        let w = self.width as isize;
        let mut vo = self.loc.line_voffset as isize;
        let cvo = self.loc.cursor_voffset as isize;

        let mut threshold = w - 1;
        if vo != 0 {
            threshold -= ht - 1;
        }

        if cvo - vo >= threshold {
            vo = cvo + (ht - w + 1);
        }

        if vo != 0 && cvo - vo < ht {
            vo = (cvo - ht).max(0);
        }

        let vo = vo.max(0) as usize;
        if self.loc.line_voffset != vo {
            self.loc.line_voffset = vo;
            self.dirty = Dirty::EVERYTHING;
        }
    }

    /// Scrolls by `n` lines (up when negative) and drags the cursor along.
    pub fn move_view_n_lines(&mut self, buffer: &Buffer, n: isize) {
        let prev_top = self.loc.top_line_num;
        self.move_top_line_n_times(buffer.lines(), n);
        self.adjust_cursor_line(buffer);
        if prev_top != self.loc.top_line_num {
            self.dirty = Dirty::EVERYTHING;
        }
    }

    /// Scrolls by `n` lines only if all of them are available.
    pub fn maybe_move_view_n_lines(&mut self, buffer: &Buffer, n: isize) {
        if self.can_move_top_line_n_times(buffer.lines(), n) {
            self.move_view_n_lines(buffer, n);
        }
    }

    pub fn move_view_half_forward(&mut self, buffer: &Buffer) {
        let n = self.height() as isize / 2;
        self.maybe_move_view_n_lines(buffer, n);
    }

    pub fn move_view_half_backward(&mut self, buffer: &Buffer) {
        let n = self.height() as isize / 2;
        self.move_view_n_lines(buffer, -n);
    }
}

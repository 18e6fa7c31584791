//! Keeping several views of one buffer consistent.
//!
//! The view that runs a command fixes its own cursor afterwards, so during
//! the edit it only needs its top line kept valid. Every other view gets
//! the full treatment through its [`EditObserver`] implementation.
//!
//! ## Learning: Observers Without Shared Ownership
//!
//! There is no `Rc<RefCell<View>>` anywhere. The buffer is the only writer
//! and hands `&Buffer` to an observer that is borrowed just for the call.
//! The editor takes the acting view out of its map, so the peers left in
//! the map can be borrowed mutably at the same time.

use quill_buffer::{Action, Buffer, EditObserver, TopLineChange, ViewLocation};

use super::{Dirty, View};

/// Observer used while a view edits its buffer: repairs the acting view's
/// top line and forwards to the peers.
pub(super) struct Broadcast<'a, 'p> {
    loc: &'a mut ViewLocation,
    peers: &'a mut (dyn EditObserver + 'p),
}

impl<'a, 'p> Broadcast<'a, 'p> {
    pub(super) fn new(loc: &'a mut ViewLocation, peers: &'a mut (dyn EditObserver + 'p)) -> Self {
        Self { loc, peers }
    }
}

impl EditObserver for Broadcast<'_, '_> {
    fn on_insert(&mut self, buffer: &Buffer, action: &Action) {
        self.loc.on_insert_adjust_top(action);
        self.peers.on_insert(buffer, action);
    }

    fn on_delete(&mut self, buffer: &Buffer, action: &Action) {
        self.loc.on_delete_adjust_top(action, buffer.lines());
        self.peers.on_delete(buffer, action);
    }
}

/// A view reacting to an edit made through another view.
impl EditObserver for View {
    fn on_insert(&mut self, buffer: &Buffer, action: &Action) {
        if self.loc.on_insert_adjust_top(action) == TopLineChange::Renumbered {
            self.dirty |= Dirty::STATUS;
        }

        let at = action.cursor.line_num;
        if self.loc.top_line_num + self.height() <= at {
            return;
        }
        if at < self.loc.top_line_num {
            // above the view: only line numbers move
            if !action.lines.is_empty() {
                self.loc.cursor.line_num += action.lines.len();
                self.dirty |= Dirty::STATUS;
            }
            return;
        }

        let mut c = self.loc.cursor;
        c.on_insert_adjust(action);
        self.move_cursor_to(buffer, c);
        self.loc.last_cursor_voffset = self.loc.cursor_voffset;
        self.dirty = Dirty::EVERYTHING;
    }

    fn on_delete(&mut self, buffer: &Buffer, action: &Action) {
        let top_before = self.loc.top_line_num;
        match self.loc.on_delete_adjust_top(action, buffer.lines()) {
            TopLineChange::Renumbered => self.dirty |= Dirty::STATUS,
            TopLineChange::Repointed => self.dirty = Dirty::EVERYTHING,
            TopLineChange::Unchanged => {}
        }

        let at = action.cursor.line_num;
        if self.loc.top_line_num + self.height() <= at {
            return;
        }
        if at < top_before {
            if action.lines.is_empty() {
                return;
            }
            let (_, last) = action.deleted_lines();
            if last < top_before {
                self.loc.cursor.line_num -= action.lines.len();
                self.dirty |= Dirty::STATUS;
                return;
            }
        }

        let mut c = self.loc.cursor;
        c.on_delete_adjust(action);
        self.move_cursor_to(buffer, c);
        self.loc.last_cursor_voffset = self.loc.cursor_voffset;
        self.dirty = Dirty::EVERYTHING;
    }
}

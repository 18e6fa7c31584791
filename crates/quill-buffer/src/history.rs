//! Undo/redo history.
//!
//! ## Learning: A List That Never Empties
//!
//! History is a sequence of [`ActionGroup`]s with a `current` index. Index
//! 0 is a sentinel that never holds actions, so "nothing to undo" is simply
//! `current == 0`. Finalizing the current group always appends its
//! successor first, so advancing into "the next group" never has to create
//! anything on the fly.
//!
//! The buffer drives the state machine (it owns both the lines and the
//! history and has to revert actions against the former); this module only
//! keeps the bookkeeping.

use crate::action::Action;
use crate::cursor::Cursor;

/// One undo step: the actions of one command run plus the cursor before and
/// after it.
#[derive(Debug, Clone)]
pub struct ActionGroup {
    pub actions: Vec<Action>,
    pub before: Cursor,
    pub after: Cursor,
}

impl ActionGroup {
    fn empty(at: Cursor) -> Self {
        Self {
            actions: Vec::new(),
            before: at,
            after: at,
        }
    }
}

/// The group list and the position in it.
#[derive(Debug, Clone)]
pub struct History {
    groups: Vec<ActionGroup>,
    current: usize,
}

impl History {
    /// Creates a history holding the sentinel and its empty successor.
    pub fn new(start: Cursor) -> Self {
        Self {
            groups: vec![ActionGroup::empty(start), ActionGroup::empty(start)],
            current: 0,
        }
    }

    /// Index of the current group; 0 is the sentinel.
    pub fn current(&self) -> usize {
        self.current
    }

    pub fn current_group(&self) -> &ActionGroup {
        &self.groups[self.current]
    }

    /// Number of groups, the sentinel included.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// True when no edit has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.groups.iter().all(|group| group.actions.is_empty())
    }

    pub fn can_undo(&self) -> bool {
        self.current > 0
    }

    /// A successor with no recorded actions counts as nothing to redo.
    pub fn can_redo(&self) -> bool {
        self.groups
            .get(self.current + 1)
            .is_some_and(|group| !group.actions.is_empty())
    }

    /// Moves into the successor group if the current one was finalized,
    /// discarding everything after it. `before` is the cursor the new group
    /// restores on undo.
    pub fn open_group(&mut self, before: Cursor) {
        if self.current + 1 >= self.groups.len() {
            return;
        }
        self.current += 1;
        self.groups.truncate(self.current + 1);

        let group = &mut self.groups[self.current];
        group.actions.clear();
        group.before = before;
        group.after = before;
        tracing::debug!(target: "quill::history", group = self.current, "group opened");
    }

    /// Closes the current group if it is the tip of the list.
    pub fn finalize(&mut self, after: Cursor) {
        if self.current + 1 < self.groups.len() {
            return;
        }
        self.groups[self.current].after = after;
        self.groups.push(ActionGroup::empty(after));
        tracing::debug!(target: "quill::history", group = self.current, "group finalized");
    }

    /// Appends an already applied action to the current group, merging it
    /// into the previous one when the two are contiguous.
    pub fn record(&mut self, action: Action) {
        let group = &mut self.groups[self.current];
        if let Some(last) = group.actions.last_mut() {
            if last.try_merge(&action) {
                return;
            }
        }
        group.actions.push(action);
    }

    /// Takes the current group's actions out for reverting; hand them back
    /// with `History::step_back`.
    pub(crate) fn take_current(&mut self) -> Vec<Action> {
        std::mem::take(&mut self.groups[self.current].actions)
    }

    /// Puts the actions back and moves to the previous group, returning the
    /// cursor the undone group started from.
    pub(crate) fn step_back(&mut self, actions: Vec<Action>) -> Cursor {
        let group = &mut self.groups[self.current];
        group.actions = actions;
        let before = group.before;
        self.current -= 1;
        before
    }

    /// Moves into the successor and takes its actions out for applying;
    /// hand them back with `History::put_current`.
    pub(crate) fn step_forward(&mut self) -> Vec<Action> {
        self.current += 1;
        self.take_current()
    }

    /// Puts the actions back into the current group, returning its `after`.
    pub(crate) fn put_current(&mut self, actions: Vec<Action>) -> Cursor {
        let group = &mut self.groups[self.current];
        group.actions = actions;
        group.after
    }

    /// Logs every group and action at debug level.
    pub fn dump(&self) {
        for (i, group) in self.groups.iter().enumerate() {
            let marker = if i == self.current { "*" } else { " " };
            tracing::debug!(
                target: "quill::history",
                "{marker}group {i}: {} actions, before {}:{}, after {}:{}",
                group.actions.len(),
                group.before.line_num,
                group.before.boffset,
                group.after.line_num,
                group.after.boffset,
            );
            for action in &group.actions {
                tracing::debug!(
                    target: "quill::history",
                    "    {:?} at {}:{} {:?} (+{} lines)",
                    action.kind,
                    action.cursor.line_num,
                    action.cursor.boffset,
                    String::from_utf8_lossy(&action.data),
                    action.lines.len(),
                );
            }
        }
    }
}

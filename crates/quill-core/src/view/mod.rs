//! Views: a rectangle onto a buffer with its own cursor and scroll state.
//!
//! A view never owns its buffer. Every operation that reads or edits text
//! receives the buffer explicitly, usually bundled in a [`ViewContext`]
//! together with the other views of the same buffer and the status
//! reporter. The [`crate::Editor`] builds that context for each command.
//!
//! ## Learning: Splitting `impl` Blocks Across Files
//!
//! `View` has one struct definition here and several `impl View` blocks in
//! the submodules:
//! - `scroll`: top line and horizontal pan corrections
//! - `motion`: cursor movement, all committed through `move_cursor_to`
//! - `edit`: insertion, deletion, mark, undo/redo, autocompletion
//! - `sync`: reacting to edits made through other views
//!
//! Private fields are visible to child modules, so the split costs nothing
//! in encapsulation.

mod edit;
mod motion;
mod scroll;
mod sync;

use quill_buffer::{find_closest_offsets, Buffer, EditObserver, ViewId, ViewLocation};

use crate::autocomplete::{Autocomplete, CompletionSource};
use crate::command::{Command, CommandClass};
use crate::editor::BufferId;
use crate::status::StatusReporter;

bitflags::bitflags! {
    /// Regions of a view that must be redrawn.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Dirty: u8 {
        /// Visible text, scroll position or cursor cell.
        const CONTENTS = 0b01;
        /// Line and column indicators only.
        const STATUS = 0b10;
        const EVERYTHING = Self::CONTENTS.bits() | Self::STATUS.bits();
    }
}

/// Geometry settings of a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewConfig {
    pub tab_width: usize,
    /// Rows kept between the cursor and the top/bottom edge.
    pub vertical_margin: usize,
    /// Columns kept between the cursor and the left/right edge.
    pub horizontal_margin: usize,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            tab_width: quill_buffer::DEFAULT_TAB_WIDTH,
            vertical_margin: 5,
            horizontal_margin: 10,
        }
    }
}

/// Everything a view needs from the outside to run one command.
pub struct ViewContext<'a> {
    pub buffer: &'a mut Buffer,
    /// The other views attached to `buffer`.
    pub peers: &'a mut dyn EditObserver,
    pub status: &'a mut dyn StatusReporter,
    pub completion: Option<&'a dyn CompletionSource>,
}

/// A viewport onto one buffer.
#[derive(Debug)]
pub struct View {
    id: ViewId,
    buffer: Option<BufferId>,
    loc: ViewLocation,
    width: usize,
    height: usize,
    oneline: bool,
    dirty: Dirty,
    autocomplete: Autocomplete,
    last_class: CommandClass,
    config: ViewConfig,
}

impl View {
    /// Creates a view of `width` x `height` cells attached to `buffer`.
    pub fn new(
        config: ViewConfig,
        buffer_id: BufferId,
        buffer: &mut Buffer,
        width: usize,
        height: usize,
    ) -> Self {
        let mut view = Self {
            id: ViewId::new(),
            buffer: None,
            loc: buffer.saved_location(),
            width,
            height,
            oneline: false,
            dirty: Dirty::EVERYTHING,
            autocomplete: Autocomplete::Inactive,
            last_class: CommandClass::None,
            config,
        };
        view.attach(buffer_id, buffer);
        view
    }

    /// Creates a view without a status row, as used for prompts.
    pub fn new_oneline(config: ViewConfig, buffer_id: BufferId, buffer: &mut Buffer, width: usize) -> Self {
        let mut view = Self::new(config, buffer_id, buffer, width, 1);
        view.oneline = true;
        view
    }

    pub fn id(&self) -> ViewId {
        self.id
    }

    /// The buffer this view is attached to.
    pub fn buffer(&self) -> Option<BufferId> {
        self.buffer
    }

    pub fn location(&self) -> &ViewLocation {
        &self.loc
    }

    pub fn config(&self) -> &ViewConfig {
        &self.config
    }

    pub fn is_oneline(&self) -> bool {
        self.oneline
    }

    pub fn autocomplete(&self) -> &Autocomplete {
        &self.autocomplete
    }

    pub fn last_class(&self) -> CommandClass {
        self.last_class
    }

    // ==================== Geometry ====================

    pub fn width(&self) -> usize {
        self.width
    }

    /// Rows available for text: the full height minus the status row.
    pub fn height(&self) -> usize {
        if self.oneline {
            self.height
        } else {
            self.height.saturating_sub(1)
        }
    }

    /// Vertical scroll margin, clamped to half the usable height.
    pub fn vertical_threshold(&self) -> isize {
        let max = (self.height() as isize - 1) / 2;
        (self.config.vertical_margin as isize).min(max)
    }

    /// Horizontal scroll margin, clamped to half the width.
    pub fn horizontal_threshold(&self) -> isize {
        let max = (self.width as isize - 1) / 2;
        (self.config.horizontal_margin as isize).min(max)
    }

    /// Changes the viewport size and brings the cursor back into view.
    pub fn resize(&mut self, buffer: &Buffer, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.adjust_line_voffset();
        self.adjust_top_line(buffer.lines());
        self.dirty = Dirty::EVERYTHING;
    }

    /// Cursor cell relative to the top-left corner of the text area.
    pub fn cursor_position(&self) -> (usize, usize) {
        let y = self.loc.cursor.line_num.saturating_sub(self.loc.top_line_num);
        let x = self.loc.cursor_voffset.saturating_sub(self.loc.line_voffset);
        (x, y)
    }

    /// The visible lines as `(line_num, bytes)`, top to bottom. The cursor
    /// line starts at the horizontal pan.
    pub fn render_lines<'b>(&self, buffer: &'b Buffer) -> Vec<(usize, &'b [u8])> {
        let lines = buffer.lines();
        let mut out = Vec::with_capacity(self.height());
        let mut line = Some(self.loc.top_line);
        let mut line_num = self.loc.top_line_num;
        while let Some(id) = line {
            if out.len() >= self.height() {
                break;
            }
            let mut data = lines.data(id);
            if id == self.loc.cursor.line && self.loc.line_voffset != 0 {
                let pan = find_closest_offsets(data, self.loc.line_voffset, self.config.tab_width);
                data = &data[pan.boffset..];
            }
            out.push((line_num, data));
            line = lines.next(id);
            line_num += 1;
        }
        out
    }

    // ==================== Dirty Flags ====================

    pub fn dirty(&self) -> Dirty {
        self.dirty
    }

    /// Called by the renderer for the regions it redrew.
    pub fn clear_dirty(&mut self, redrawn: Dirty) {
        self.dirty.remove(redrawn);
    }

    // ==================== Lifecycle ====================

    pub fn activate(&mut self) {
        self.last_class = CommandClass::None;
    }

    /// Loses focus. A running completion does not survive this.
    pub fn deactivate(&mut self) {
        self.autocomplete = Autocomplete::Inactive;
    }

    /// Attaches to `buffer`, resuming where its last view left off.
    ///
    /// The view must be detached from its previous buffer first.
    pub fn attach(&mut self, buffer_id: BufferId, buffer: &mut Buffer) {
        if self.buffer == Some(buffer_id) {
            return;
        }
        self.buffer = Some(buffer_id);
        self.loc = buffer.saved_location();
        buffer.add_view(self.id);

        // offsets stored with the location may predate later edits
        let (vo, co) = self.loc.cursor.voffset_coffset(buffer.lines(), self.config.tab_width);
        self.loc.cursor_voffset = vo;
        self.loc.cursor_coffset = co;
        self.adjust_line_voffset();
        self.adjust_top_line(buffer.lines());

        self.autocomplete = Autocomplete::Inactive;
        self.last_class = CommandClass::None;
        self.dirty = Dirty::EVERYTHING;
        tracing::debug!(target: "quill::view", view = %self.id, buffer = %buffer_id, "attached");
    }

    /// Detaches from `buffer`, leaving the location behind for the next
    /// view that attaches.
    pub fn detach(&mut self, buffer: &mut Buffer) {
        if self.buffer.take().is_none() {
            return;
        }
        buffer.save_location(self.loc);
        buffer.remove_view(self.id);
        self.autocomplete = Autocomplete::Inactive;
        tracing::debug!(target: "quill::view", view = %self.id, "detached");
    }

    // ==================== Commands ====================

    /// Runs one command. A class change relative to the previous command
    /// closes the open undo step first.
    pub fn on_command(&mut self, cmd: Command, ctx: &mut ViewContext<'_>) {
        let class = cmd.class();
        if class != self.last_class || class == CommandClass::Misc {
            self.last_class = class;
            ctx.buffer.finalize_action_group(self.loc.cursor);
        }
        tracing::trace!(target: "quill::view", view = %self.id, command = %cmd, "command");

        match cmd {
            Command::MoveCursorForward => self.move_cursor_forward(ctx),
            Command::MoveCursorBackward => self.move_cursor_backward(ctx),
            Command::MoveCursorWordForward => self.move_cursor_word_forward(ctx),
            Command::MoveCursorWordBackward => self.move_cursor_word_backward(ctx),
            Command::MoveCursorNextLine => self.move_cursor_next_line(ctx),
            Command::MoveCursorPrevLine => self.move_cursor_prev_line(ctx),
            Command::MoveCursorBeginningOfLine => self.move_cursor_beginning_of_line(ctx.buffer),
            Command::MoveCursorEndOfLine => self.move_cursor_end_of_line(ctx.buffer),
            Command::MoveCursorBeginningOfFile => self.move_cursor_beginning_of_file(ctx.buffer),
            Command::MoveCursorEndOfFile => self.move_cursor_end_of_file(ctx.buffer),
            Command::MoveViewHalfForward => self.move_view_half_forward(ctx.buffer),
            Command::MoveViewHalfBackward => self.move_view_half_backward(ctx.buffer),
            Command::SetMark => self.set_mark(ctx),
            Command::SwapCursorAndMark => self.swap_cursor_and_mark(ctx.buffer),
            Command::InsertRune(r) => self.insert_rune(ctx, r),
            Command::DeleteRuneBackward => self.delete_rune_backward(ctx),
            Command::DeleteRune => self.delete_rune(ctx),
            Command::KillLine => self.kill_line(ctx),
            Command::KillWord => self.kill_word(ctx),
            Command::KillRegion => self.kill_region(ctx),
            Command::Undo => self.undo(ctx),
            Command::Redo => self.redo(ctx),
            Command::AutocompleteInit => self.autocomplete_init(ctx),
            Command::AutocompleteMoveCursorUp => self.autocomplete_move_cursor_up(),
            Command::AutocompleteMoveCursorDown => self.autocomplete_move_cursor_down(),
            Command::AutocompleteFinalize => self.autocomplete_finalize(ctx),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::StatusLog;

    pub(super) struct Fixture {
        pub buffer: Buffer,
        pub view: View,
        pub status: StatusLog,
    }

    impl Fixture {
        pub fn new(text: &str, width: usize, height: usize) -> Self {
            let mut buffer = Buffer::from(text);
            let view = View::new(ViewConfig::default(), BufferId::new(), &mut buffer, width, height);
            Self { buffer, view, status: StatusLog::new() }
        }

        pub fn run(&mut self, cmd: Command) {
            let mut peers = ();
            let mut ctx = ViewContext {
                buffer: &mut self.buffer,
                peers: &mut peers,
                status: &mut self.status,
                completion: None,
            };
            self.view.on_command(cmd, &mut ctx);
        }

        pub fn run_n(&mut self, cmd: Command, n: usize) {
            for _ in 0..n {
                self.run(cmd);
            }
        }

        pub fn cursor(&self) -> (usize, usize) {
            let c = self.view.location().cursor;
            (c.line_num, c.boffset)
        }
    }

    #[test]
    fn test_geometry_thresholds() {
        let f = Fixture::new("", 80, 21);
        assert_eq!(f.view.height(), 20);
        assert_eq!(f.view.vertical_threshold(), 5);
        assert_eq!(f.view.horizontal_threshold(), 10);

        let f = Fixture::new("", 7, 4);
        assert_eq!(f.view.height(), 3);
        assert_eq!(f.view.vertical_threshold(), 1);
        assert_eq!(f.view.horizontal_threshold(), 3);
    }

    #[test]
    fn test_oneline_uses_full_height() {
        let mut buffer = Buffer::from("prompt");
        let view = View::new_oneline(ViewConfig::default(), BufferId::new(), &mut buffer, 40);
        assert!(view.is_oneline());
        assert_eq!(view.height(), 1);
        assert_eq!(view.vertical_threshold(), 0);
    }

    #[test]
    fn test_clear_dirty_keeps_other_bits() {
        let mut f = Fixture::new("abc", 80, 10);
        assert_eq!(f.view.dirty(), Dirty::EVERYTHING);
        f.view.clear_dirty(Dirty::CONTENTS);
        assert_eq!(f.view.dirty(), Dirty::STATUS);
        f.view.clear_dirty(Dirty::STATUS);
        assert!(f.view.dirty().is_empty());

        f.run(Command::MoveCursorForward);
        assert!(f.view.dirty().contains(Dirty::STATUS));
    }

    #[test]
    fn test_detach_saves_location() {
        let mut f = Fixture::new("one\ntwo\nthree", 80, 10);
        f.run(Command::MoveCursorNextLine);
        f.run(Command::MoveCursorEndOfLine);
        let id = f.view.buffer().unwrap();
        f.view.detach(&mut f.buffer);
        assert_eq!(f.view.buffer(), None);
        assert!(f.buffer.views().is_empty());

        let other = View::new(ViewConfig::default(), id, &mut f.buffer, 80, 10);
        assert_eq!(other.location().cursor.line_num, 2);
        assert_eq!(other.location().cursor.boffset, 3);
        assert_eq!(other.location().cursor_voffset, 3);
    }

    #[test]
    fn test_render_lines_from_top() {
        let f = Fixture::new("a\nb\nc\nd", 80, 3);
        let rows = f.view.render_lines(&f.buffer);
        assert_eq!(rows, vec![(1, &b"a"[..]), (2, &b"b"[..])]);
    }

    #[test]
    fn test_resize_keeps_cursor_visible() {
        let text: Vec<String> = (1..=50).map(|i| i.to_string()).collect();
        let mut f = Fixture::new(&text.join("\n"), 80, 30);
        f.run_n(Command::MoveCursorNextLine, 20);
        assert_eq!(f.view.location().top_line_num, 1);

        f.view.resize(&f.buffer, 80, 11);
        let loc = f.view.location();
        let row = loc.cursor.line_num - loc.top_line_num;
        assert!(row < f.view.height() - f.view.vertical_threshold() as usize);
        assert_eq!(f.view.dirty(), Dirty::EVERYTHING);
    }
}

//! Main editor orchestration.
//!
//! ## Learning: The Facade Pattern
//!
//! `Editor` acts as a facade, providing a simple interface to
//! complex subsystems. External code only needs to interact with
//! `Editor`, not individual buffers and views.
//!
//! ## Learning: Taking a Value Out to Borrow the Rest
//!
//! A command runs on one view but its edits must reach every other view of
//! the same buffer. [`Editor::execute`] removes the acting view from the
//! map, lends the map to the buffer as the observer of the edit, and puts
//! the view back afterwards. No interior mutability is needed.

use std::collections::HashMap;
use std::fmt;
use std::io::Read;
use std::path::Path;

use quill_buffer::{Action, Buffer, EditObserver, ViewId};
use uuid::Uuid;

use crate::autocomplete::CompletionSource;
use crate::command::Command;
use crate::config::Config;
use crate::status::StatusLog;
use crate::view::{Dirty, View, ViewContext};
use crate::{CoreError, CoreResult};

/// Unique identifier for a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferId(Uuid);

impl BufferId {
    /// Creates a new unique buffer ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for BufferId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BufferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The views of a buffer other than the one running a command.
struct PeerViews<'a> {
    views: &'a mut HashMap<ViewId, View>,
}

impl EditObserver for PeerViews<'_> {
    fn on_insert(&mut self, buffer: &Buffer, action: &Action) {
        for id in buffer.views() {
            if let Some(view) = self.views.get_mut(id) {
                view.on_insert(buffer, action);
            }
        }
    }

    fn on_delete(&mut self, buffer: &Buffer, action: &Action) {
        for id in buffer.views() {
            if let Some(view) = self.views.get_mut(id) {
                view.on_delete(buffer, action);
            }
        }
    }
}

/// The main editor state.
///
/// ## Thread Safety
///
/// `Editor` is designed to be owned by a single thread. Every command takes
/// `&mut self`, so a buffer and its views are never mutated concurrently;
/// a multi-threaded host wraps the whole editor in a mutex.
pub struct Editor {
    /// Open buffers
    buffers: HashMap<BufferId, Buffer>,

    /// All views, attached or not
    views: HashMap<ViewId, View>,

    /// The view receiving commands by default
    active: Option<ViewId>,

    /// Notices produced by commands
    status: StatusLog,

    /// Where proposals come from, if anywhere
    completion: Option<Box<dyn CompletionSource>>,

    /// Editor configuration
    config: Config,
}

impl Editor {
    /// Creates a new editor instance.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Creates an editor with custom configuration.
    pub fn with_config(config: Config) -> Self {
        Self {
            buffers: HashMap::new(),
            views: HashMap::new(),
            active: None,
            status: StatusLog::new(),
            completion: None,
            config,
        }
    }

    // ==================== Buffer Operations ====================

    /// Creates an empty buffer.
    pub fn new_buffer(&mut self) -> BufferId {
        self.add_buffer(Buffer::new())
    }

    /// Loads a buffer from `reader`.
    pub fn open_reader(&mut self, name: &str, reader: impl Read) -> CoreResult<BufferId> {
        let mut buffer = Buffer::from_reader(reader)?;
        buffer.set_name(name);
        Ok(self.add_buffer(buffer))
    }

    /// Opens a file, reusing the buffer if it is already open.
    ///
    /// Buffers remember the canonical path, so different spellings of the
    /// same file share one buffer.
    pub fn open_file(&mut self, path: impl AsRef<Path>) -> CoreResult<BufferId> {
        let path = std::fs::canonicalize(path.as_ref())?;
        if let Some((&id, _)) = self.buffers.iter().find(|(_, b)| b.path() == Some(path.as_path())) {
            return Ok(id);
        }
        let buffer = Buffer::from_file(&path)?;
        Ok(self.add_buffer(buffer))
    }

    fn add_buffer(&mut self, buffer: Buffer) -> BufferId {
        let id = BufferId::new();
        tracing::debug!(target: "quill::editor", buffer = %id, name = buffer.name(), "buffer added");
        self.buffers.insert(id, buffer);
        id
    }

    /// Returns a buffer by ID.
    pub fn buffer(&self, id: BufferId) -> CoreResult<&Buffer> {
        self.buffers.get(&id).ok_or(CoreError::BufferNotFound(id))
    }

    /// Returns all open buffers.
    pub fn buffers(&self) -> impl Iterator<Item = (BufferId, &Buffer)> {
        self.buffers.iter().map(|(&id, b)| (id, b))
    }

    /// The whole text of a buffer.
    pub fn buffer_text(&self, id: BufferId) -> CoreResult<String> {
        Ok(self.buffer(id)?.text())
    }

    /// Saves a buffer to the file it was loaded from.
    pub fn save_buffer(&mut self, id: BufferId) -> CoreResult<()> {
        let buffer = self.buffers.get_mut(&id).ok_or(CoreError::BufferNotFound(id))?;
        let path = buffer.path().ok_or(CoreError::NoPath(id))?.to_path_buf();
        buffer.save_to(&path)?;
        Ok(())
    }

    /// Saves a buffer to `path`, which becomes its file from now on.
    pub fn save_buffer_as(&mut self, id: BufferId, path: impl AsRef<Path>) -> CoreResult<()> {
        let buffer = self.buffers.get_mut(&id).ok_or(CoreError::BufferNotFound(id))?;
        buffer.save_to(path)?;
        Ok(())
    }

    /// Returns true if any buffer has unsaved changes.
    pub fn has_unsaved_changes(&self) -> bool {
        self.buffers.values().any(|b| b.is_modified())
    }

    // ==================== View Operations ====================

    /// Creates a view of `width` x `height` cells onto a buffer. The first
    /// view created becomes the active one.
    pub fn new_view(&mut self, buffer_id: BufferId, width: usize, height: usize) -> CoreResult<ViewId> {
        let buffer = self
            .buffers
            .get_mut(&buffer_id)
            .ok_or(CoreError::BufferNotFound(buffer_id))?;
        let view = View::new(self.config.view_config(), buffer_id, buffer, width, height);
        Ok(self.add_view(view))
    }

    /// Creates a single-line view, without a status row.
    pub fn new_oneline_view(&mut self, buffer_id: BufferId, width: usize) -> CoreResult<ViewId> {
        let buffer = self
            .buffers
            .get_mut(&buffer_id)
            .ok_or(CoreError::BufferNotFound(buffer_id))?;
        let view = View::new_oneline(self.config.view_config(), buffer_id, buffer, width);
        Ok(self.add_view(view))
    }

    fn add_view(&mut self, view: View) -> ViewId {
        let id = view.id();
        self.views.insert(id, view);
        if self.active.is_none() {
            self.active = Some(id);
        }
        id
    }

    /// Returns a view by ID.
    pub fn view(&self, id: ViewId) -> CoreResult<&View> {
        self.views.get(&id).ok_or(CoreError::ViewNotFound(id))
    }

    /// The regions of a view that need redrawing.
    pub fn dirty(&self, id: ViewId) -> CoreResult<Dirty> {
        Ok(self.view(id)?.dirty())
    }

    /// Marks regions of a view as redrawn.
    pub fn clear_dirty(&mut self, id: ViewId, redrawn: Dirty) -> CoreResult<()> {
        self.views
            .get_mut(&id)
            .ok_or(CoreError::ViewNotFound(id))?
            .clear_dirty(redrawn);
        Ok(())
    }

    /// Moves a view to another buffer.
    pub fn attach(&mut self, view_id: ViewId, buffer_id: BufferId) -> CoreResult<()> {
        if !self.buffers.contains_key(&buffer_id) {
            return Err(CoreError::BufferNotFound(buffer_id));
        }
        let view = self.views.get_mut(&view_id).ok_or(CoreError::ViewNotFound(view_id))?;
        if let Some(old) = view.buffer() {
            if old == buffer_id {
                return Ok(());
            }
            if let Some(buffer) = self.buffers.get_mut(&old) {
                view.detach(buffer);
            }
        }
        let buffer = self
            .buffers
            .get_mut(&buffer_id)
            .ok_or(CoreError::BufferNotFound(buffer_id))?;
        view.attach(buffer_id, buffer);
        Ok(())
    }

    /// Detaches a view from its buffer, leaving the buffer its location.
    pub fn detach(&mut self, view_id: ViewId) -> CoreResult<()> {
        let view = self.views.get_mut(&view_id).ok_or(CoreError::ViewNotFound(view_id))?;
        if let Some(buffer) = view.buffer().and_then(|id| self.buffers.get_mut(&id)) {
            view.detach(buffer);
        }
        Ok(())
    }

    /// Detaches and drops a view.
    pub fn close_view(&mut self, view_id: ViewId) -> CoreResult<()> {
        self.detach(view_id)?;
        self.views.remove(&view_id);
        if self.active == Some(view_id) {
            self.active = None;
        }
        Ok(())
    }

    pub fn resize_view(&mut self, view_id: ViewId, width: usize, height: usize) -> CoreResult<()> {
        let view = self.views.get_mut(&view_id).ok_or(CoreError::ViewNotFound(view_id))?;
        let buffer_id = view.buffer().ok_or(CoreError::ViewDetached(view_id))?;
        let buffer = self
            .buffers
            .get(&buffer_id)
            .ok_or(CoreError::BufferNotFound(buffer_id))?;
        view.resize(buffer, width, height);
        Ok(())
    }

    /// Gives focus to a view, taking it from the previous one.
    pub fn activate_view(&mut self, view_id: ViewId) -> CoreResult<()> {
        if !self.views.contains_key(&view_id) {
            return Err(CoreError::ViewNotFound(view_id));
        }
        if let Some(prev) = self.active.and_then(|id| self.views.get_mut(&id)) {
            prev.deactivate();
        }
        if let Some(view) = self.views.get_mut(&view_id) {
            view.activate();
        }
        self.active = Some(view_id);
        Ok(())
    }

    pub fn active_view(&self) -> Option<ViewId> {
        self.active
    }

    // ==================== Commands ====================

    /// Runs a command on a view.
    pub fn execute(&mut self, view_id: ViewId, cmd: Command) -> CoreResult<()> {
        let mut view = self.views.remove(&view_id).ok_or(CoreError::ViewNotFound(view_id))?;
        let result = self.execute_on(&mut view, cmd);
        self.views.insert(view_id, view);
        result
    }

    fn execute_on(&mut self, view: &mut View, cmd: Command) -> CoreResult<()> {
        let buffer_id = view.buffer().ok_or(CoreError::ViewDetached(view.id()))?;
        let buffer = self
            .buffers
            .get_mut(&buffer_id)
            .ok_or(CoreError::BufferNotFound(buffer_id))?;

        let mut peers = PeerViews { views: &mut self.views };
        let mut ctx = ViewContext {
            buffer,
            peers: &mut peers,
            status: &mut self.status,
            completion: self.completion.as_deref(),
        };
        view.on_command(cmd, &mut ctx);
        Ok(())
    }

    /// Runs a command script on a view: one command per line, blank lines
    /// and `#` comments ignored. Returns the number of commands executed.
    pub fn run_script(&mut self, view_id: ViewId, script: &str) -> CoreResult<usize> {
        let mut count = 0;
        for line in script.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let cmd: Command = line.parse()?;
            self.execute(view_id, cmd)?;
            count += 1;
        }
        tracing::debug!(target: "quill::editor", view = %view_id, count, "script finished");
        Ok(count)
    }

    // ==================== Status & Completion ====================

    pub fn status(&self) -> &StatusLog {
        &self.status
    }

    /// Drains the collected notices.
    pub fn take_status(&mut self) -> Vec<String> {
        self.status.take()
    }

    pub fn set_completion_source(&mut self, source: Box<dyn CompletionSource>) {
        self.completion = Some(source);
    }

    // ==================== Configuration ====================

    /// Returns the editor configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Updates the configuration. Views created afterwards use it.
    pub fn set_config(&mut self, config: Config) {
        self.config = config;
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}

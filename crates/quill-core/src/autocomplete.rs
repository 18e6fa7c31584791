//! Autocompletion hook.
//!
//! The view only drives a session: it starts one on request, feeds it every
//! committed cursor move, and asks it for the final replacement. What gets
//! proposed is up to the [`CompletionSource`].
//!
//! ## Learning: State as a Sum Type
//!
//! Instead of an `Option` that code has to remember to clear, the view
//! holds an [`Autocomplete`] that is either `Inactive` or `Active(session)`.
//! [`Autocomplete::update`] is the one place where an active session can
//! fall back to `Inactive`, which keeps the lifecycle rule in one spot.

use std::collections::BTreeSet;
use std::fmt;

use quill_buffer::{decode_rune, is_word, Buffer, Cursor};

/// A replacement for the text between `start` and the cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    /// Byte offset on the cursor line where the replaced prefix starts.
    pub start: usize,
    pub text: String,
}

/// Produces completion sessions.
pub trait CompletionSource {
    /// Starts a session at `cursor`, or `None` if there is nothing to offer.
    fn start(&self, buffer: &Buffer, cursor: Cursor) -> Option<Box<dyn CompletionSession>>;
}

/// One running completion.
pub trait CompletionSession {
    /// Called after every cursor move. Returning `false` ends the session.
    fn update(&mut self, buffer: &Buffer, cursor: Cursor) -> bool;

    fn move_selection_up(&mut self);

    fn move_selection_down(&mut self);

    /// Current proposals, for whoever draws them.
    fn proposals(&self) -> &[String];

    fn selected(&self) -> usize;

    /// The replacement chosen by the user.
    fn finalize(&self, buffer: &Buffer, cursor: Cursor) -> Option<Completion>;
}

/// Autocompletion state of a view.
#[derive(Default)]
pub enum Autocomplete {
    #[default]
    Inactive,
    Active(Box<dyn CompletionSession>),
}

impl Autocomplete {
    pub fn is_active(&self) -> bool {
        matches!(self, Autocomplete::Active(_))
    }

    /// Feeds the new cursor to an active session, dropping it when it no
    /// longer applies.
    pub fn update(&mut self, buffer: &Buffer, cursor: Cursor) {
        if let Autocomplete::Active(session) = self {
            if !session.update(buffer, cursor) {
                tracing::debug!(target: "quill::view", "autocompletion discarded");
                *self = Autocomplete::Inactive;
            }
        }
    }

    /// Ends the session, returning it if there was one.
    pub fn take(&mut self) -> Option<Box<dyn CompletionSession>> {
        match std::mem::take(self) {
            Autocomplete::Active(session) => Some(session),
            Autocomplete::Inactive => None,
        }
    }

    pub fn session_mut(&mut self) -> Option<&mut (dyn CompletionSession + 'static)> {
        match self {
            Autocomplete::Active(session) => Some(session.as_mut()),
            Autocomplete::Inactive => None,
        }
    }
}

impl fmt::Debug for Autocomplete {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Autocomplete::Inactive => f.write_str("Inactive"),
            Autocomplete::Active(session) => f
                .debug_struct("Active")
                .field("proposals", &session.proposals().len())
                .field("selected", &session.selected())
                .finish(),
        }
    }
}

// ==================== Buffer Words ====================

/// Proposes words already present in the buffer that start with the word
/// being typed.
#[derive(Debug, Clone, Copy, Default)]
pub struct BufferWords;

/// Splits `data` into maximal runs of word characters.
fn words(data: &[u8]) -> impl Iterator<Item = &[u8]> {
    let mut rest = data;
    std::iter::from_fn(move || {
        // skip separators
        loop {
            if rest.is_empty() {
                return None;
            }
            let (r, len) = decode_rune(rest);
            if is_word(r) {
                break;
            }
            rest = &rest[len..];
        }
        let mut end = 0;
        while end < rest.len() {
            let (r, len) = decode_rune(&rest[end..]);
            if !is_word(r) {
                break;
            }
            end += len;
        }
        let (word, tail) = rest.split_at(end);
        rest = tail;
        Some(word)
    })
}

/// Byte offset where the word ending at `boffset` starts. Returns 0 for a
/// slice made only of word characters.
fn prefix_start(data: &[u8], boffset: usize) -> usize {
    let mut start = boffset;
    while start > 0 {
        let (r, len) = quill_buffer::decode_last_rune(&data[..start]);
        if !is_word(r) {
            break;
        }
        start -= len;
    }
    start
}

impl CompletionSource for BufferWords {
    fn start(&self, buffer: &Buffer, cursor: Cursor) -> Option<Box<dyn CompletionSession>> {
        let data = buffer.line_data(cursor.line);
        let start = prefix_start(data, cursor.boffset);

        let mut vocabulary = BTreeSet::new();
        for line in buffer.lines().iter() {
            for word in words(buffer.line_data(line)) {
                vocabulary.insert(String::from_utf8_lossy(word).into_owned());
            }
        }

        let mut session = WordSession {
            line: cursor.line,
            start,
            vocabulary: vocabulary.into_iter().collect(),
            proposals: Vec::new(),
            selected: 0,
        };
        session.update(buffer, cursor).then(|| Box::new(session) as Box<dyn CompletionSession>)
    }
}

struct WordSession {
    line: quill_buffer::LineId,
    start: usize,
    vocabulary: Vec<String>,
    proposals: Vec<String>,
    selected: usize,
}

impl CompletionSession for WordSession {
    fn update(&mut self, buffer: &Buffer, cursor: Cursor) -> bool {
        if cursor.line != self.line || cursor.boffset < self.start {
            return false;
        }
        let data = buffer.line_data(cursor.line);
        let Some(typed) = data.get(self.start..cursor.boffset) else {
            return false;
        };
        if prefix_start(typed, typed.len()) != 0 {
            return false;
        }

        let prefix = String::from_utf8_lossy(typed);
        self.proposals = self
            .vocabulary
            .iter()
            .filter(|word| word.starts_with(&*prefix) && word.as_str() != &*prefix)
            .cloned()
            .collect();
        self.selected = self.selected.min(self.proposals.len().saturating_sub(1));
        !self.proposals.is_empty()
    }

    fn move_selection_up(&mut self) {
        if self.proposals.is_empty() {
            return;
        }
        self.selected = self
            .selected
            .checked_sub(1)
            .unwrap_or(self.proposals.len() - 1);
    }

    fn move_selection_down(&mut self) {
        if self.proposals.is_empty() {
            return;
        }
        self.selected = (self.selected + 1) % self.proposals.len();
    }

    fn proposals(&self) -> &[String] {
        &self.proposals
    }

    fn selected(&self) -> usize {
        self.selected
    }

    fn finalize(&self, _buffer: &Buffer, cursor: Cursor) -> Option<Completion> {
        if cursor.line != self.line {
            return None;
        }
        self.proposals.get(self.selected).map(|text| Completion {
            start: self.start,
            text: text.clone(),
        })
    }
}

//! The closed set of commands a view understands.
//!
//! ## Learning: The Command Pattern
//!
//! Commands encapsulate actions as values:
//! - Actions become first-class values
//! - Can be stored, queued, parsed from a script
//! - Their class decides where one undo step ends and the next begins
//!
//! ## Trait Objects vs Enums
//!
//! The set of view commands is fixed, so an enum is all we need:
//! exhaustive matching, no allocation, and `class()` stays a pure
//! function of the variant.

use std::fmt;
use std::str::FromStr;

use crate::CoreError;

/// Every command a view can execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    // Movement
    MoveCursorForward,
    MoveCursorBackward,
    MoveCursorWordForward,
    MoveCursorWordBackward,
    MoveCursorNextLine,
    MoveCursorPrevLine,
    MoveCursorBeginningOfLine,
    MoveCursorEndOfLine,
    MoveCursorBeginningOfFile,
    MoveCursorEndOfFile,
    MoveViewHalfForward,
    MoveViewHalfBackward,
    SetMark,
    SwapCursorAndMark,

    // Insertion
    InsertRune(char),

    // Deletion
    DeleteRuneBackward,
    DeleteRune,
    KillLine,
    KillWord,
    KillRegion,

    // History
    Undo,
    Redo,

    // Autocompletion
    AutocompleteInit,
    AutocompleteMoveCursorUp,
    AutocompleteMoveCursorDown,
    AutocompleteFinalize,
}

/// Command classes. A change of class between two consecutive commands
/// closes the current undo step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CommandClass {
    /// No command executed yet.
    #[default]
    None,
    Movement,
    Insertion,
    Deletion,
    History,
    Misc,
}

/// Script names of the commands that take no argument.
const NAMED: &[(&str, Command)] = &[
    ("move-cursor-forward", Command::MoveCursorForward),
    ("move-cursor-backward", Command::MoveCursorBackward),
    ("move-cursor-word-forward", Command::MoveCursorWordForward),
    ("move-cursor-word-backward", Command::MoveCursorWordBackward),
    ("move-cursor-next-line", Command::MoveCursorNextLine),
    ("move-cursor-prev-line", Command::MoveCursorPrevLine),
    ("move-cursor-beginning-of-line", Command::MoveCursorBeginningOfLine),
    ("move-cursor-end-of-line", Command::MoveCursorEndOfLine),
    ("move-cursor-beginning-of-file", Command::MoveCursorBeginningOfFile),
    ("move-cursor-end-of-file", Command::MoveCursorEndOfFile),
    ("move-view-half-forward", Command::MoveViewHalfForward),
    ("move-view-half-backward", Command::MoveViewHalfBackward),
    ("set-mark", Command::SetMark),
    ("swap-cursor-and-mark", Command::SwapCursorAndMark),
    ("delete-rune-backward", Command::DeleteRuneBackward),
    ("delete-rune", Command::DeleteRune),
    ("kill-line", Command::KillLine),
    ("kill-word", Command::KillWord),
    ("kill-region", Command::KillRegion),
    ("undo", Command::Undo),
    ("redo", Command::Redo),
    ("autocomplete-init", Command::AutocompleteInit),
    ("autocomplete-move-cursor-up", Command::AutocompleteMoveCursorUp),
    ("autocomplete-move-cursor-down", Command::AutocompleteMoveCursorDown),
    ("autocomplete-finalize", Command::AutocompleteFinalize),
];

impl Command {
    /// Returns the class used for undo grouping.
    pub fn class(&self) -> CommandClass {
        use Command::*;
        match self {
            MoveCursorForward
            | MoveCursorBackward
            | MoveCursorWordForward
            | MoveCursorWordBackward
            | MoveCursorNextLine
            | MoveCursorPrevLine
            | MoveCursorBeginningOfLine
            | MoveCursorEndOfLine
            | MoveCursorBeginningOfFile
            | MoveCursorEndOfFile
            | MoveViewHalfForward
            | MoveViewHalfBackward
            | SetMark
            | SwapCursorAndMark => CommandClass::Movement,
            InsertRune(_) => CommandClass::Insertion,
            DeleteRuneBackward | DeleteRune | KillLine | KillWord | KillRegion => {
                CommandClass::Deletion
            }
            Undo | Redo => CommandClass::History,
            AutocompleteInit
            | AutocompleteMoveCursorUp
            | AutocompleteMoveCursorDown
            | AutocompleteFinalize => CommandClass::Misc,
        }
    }

    /// Returns the command's display name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Command::MoveCursorForward => "Move Cursor Forward",
            Command::MoveCursorBackward => "Move Cursor Backward",
            Command::MoveCursorWordForward => "Move Cursor Word Forward",
            Command::MoveCursorWordBackward => "Move Cursor Word Backward",
            Command::MoveCursorNextLine => "Move Cursor Next Line",
            Command::MoveCursorPrevLine => "Move Cursor Prev Line",
            Command::MoveCursorBeginningOfLine => "Move Cursor Beginning of Line",
            Command::MoveCursorEndOfLine => "Move Cursor End of Line",
            Command::MoveCursorBeginningOfFile => "Move Cursor Beginning of File",
            Command::MoveCursorEndOfFile => "Move Cursor End of File",
            Command::MoveViewHalfForward => "Move View Half Forward",
            Command::MoveViewHalfBackward => "Move View Half Backward",
            Command::SetMark => "Set Mark",
            Command::SwapCursorAndMark => "Swap Cursor and Mark",
            Command::InsertRune(_) => "Insert Rune",
            Command::DeleteRuneBackward => "Delete Rune Backward",
            Command::DeleteRune => "Delete Rune",
            Command::KillLine => "Kill Line",
            Command::KillWord => "Kill Word",
            Command::KillRegion => "Kill Region",
            Command::Undo => "Undo",
            Command::Redo => "Redo",
            Command::AutocompleteInit => "Autocomplete Init",
            Command::AutocompleteMoveCursorUp => "Autocomplete Move Cursor Up",
            Command::AutocompleteMoveCursorDown => "Autocomplete Move Cursor Down",
            Command::AutocompleteFinalize => "Autocomplete Finalize",
        }
    }

    /// Returns the kebab-case name used in scripts.
    pub fn script_name(&self) -> &'static str {
        match self {
            Command::InsertRune(_) => "insert-rune",
            cmd => NAMED
                .iter()
                .find(|(_, c)| c == cmd)
                .map_or("", |(name, _)| *name),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::InsertRune('\n') => f.write_str("insert-rune \\n"),
            Command::InsertRune('\t') => f.write_str("insert-rune \\t"),
            Command::InsertRune(' ') => f.write_str("insert-rune \\s"),
            Command::InsertRune('\\') => f.write_str("insert-rune \\\\"),
            Command::InsertRune(r) => write!(f, "insert-rune {r}"),
            cmd => f.write_str(cmd.script_name()),
        }
    }
}

/// Parses the argument of `insert-rune`: one character or one of the
/// escapes `\n`, `\t`, `\s` (space) and `\\`.
fn parse_rune(arg: &str) -> Option<char> {
    let mut chars = arg.chars();
    let first = chars.next()?;
    let r = if first == '\\' {
        match chars.next()? {
            'n' => '\n',
            't' => '\t',
            's' => ' ',
            '\\' => '\\',
            _ => return None,
        }
    } else {
        first
    };
    chars.next().is_none().then_some(r)
}

impl FromStr for Command {
    type Err = CoreError;

    /// Parses one script line such as `kill-line` or `insert-rune \n`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (name, arg) = match s.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, Some(arg.trim())),
            None => (s, None),
        };

        if name == "insert-rune" {
            return arg
                .and_then(parse_rune)
                .map(Command::InsertRune)
                .ok_or_else(|| CoreError::UnknownCommand(s.to_string()));
        }
        if arg.is_some() {
            return Err(CoreError::UnknownCommand(s.to_string()));
        }
        NAMED
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, cmd)| *cmd)
            .ok_or_else(|| CoreError::UnknownCommand(s.to_string()))
    }
}

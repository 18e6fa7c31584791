//! Random command sequences from two views on one buffer.

use proptest::prelude::*;
use quill_buffer::{Buffer, LineId};
use quill_core::{Command, Editor, View};

const TEXT: &str = "fn main() {\n\tlet x = 1;\n\n    println!(\"{x}\");\n}\nnaïve café\nlast";

fn command() -> impl Strategy<Value = Command> {
    prop_oneof![
        Just(Command::MoveCursorForward),
        Just(Command::MoveCursorBackward),
        Just(Command::MoveCursorWordForward),
        Just(Command::MoveCursorWordBackward),
        Just(Command::MoveCursorNextLine),
        Just(Command::MoveCursorPrevLine),
        Just(Command::MoveCursorBeginningOfLine),
        Just(Command::MoveCursorEndOfLine),
        Just(Command::MoveCursorBeginningOfFile),
        Just(Command::MoveCursorEndOfFile),
        Just(Command::MoveViewHalfForward),
        Just(Command::MoveViewHalfBackward),
        Just(Command::SetMark),
        Just(Command::SwapCursorAndMark),
        prop::sample::select(vec!['a', ' ', '\n', '\t', 'é']).prop_map(Command::InsertRune),
        Just(Command::DeleteRuneBackward),
        Just(Command::DeleteRune),
        Just(Command::KillLine),
        Just(Command::KillWord),
        Just(Command::KillRegion),
        Just(Command::Undo),
        Just(Command::Redo),
    ]
}

fn position(buffer: &Buffer, line: LineId) -> Option<usize> {
    buffer.lines().iter().position(|id| id == line).map(|i| i + 1)
}

fn check_view(buffer: &Buffer, view: &View) -> Result<(), TestCaseError> {
    let loc = view.location();
    prop_assert_eq!(position(buffer, loc.cursor.line), Some(loc.cursor.line_num));
    prop_assert_eq!(position(buffer, loc.top_line), Some(loc.top_line_num));
    prop_assert!(loc.cursor.boffset <= buffer.line_data(loc.cursor.line).len());
    prop_assert!(loc.top_line_num <= loc.cursor.line_num);
    prop_assert!(loc.cursor.line_num < loc.top_line_num + view.height());
    Ok(())
}

proptest! {
    #[test]
    fn prop_views_stay_valid(steps in prop::collection::vec((any::<bool>(), command()), 1..60)) {
        let mut editor = Editor::new();
        let buffer = editor.open_reader("prop", TEXT.as_bytes()).unwrap();
        let a = editor.new_view(buffer, 20, 6).unwrap();
        let b = editor.new_view(buffer, 20, 6).unwrap();
        editor.execute(b, Command::MoveCursorEndOfFile).unwrap();

        for (on_a, cmd) in steps {
            let acting = if on_a { a } else { b };
            editor.execute(acting, cmd).unwrap();

            let buf = editor.buffer(buffer).unwrap();
            check_view(buf, editor.view(a).unwrap())?;
            check_view(buf, editor.view(b).unwrap())?;
        }
    }

    #[test]
    fn prop_undo_everything_restores_text(cmds in prop::collection::vec(command(), 1..40)) {
        let mut editor = Editor::new();
        let buffer = editor.open_reader("prop", TEXT.as_bytes()).unwrap();
        let view = editor.new_view(buffer, 20, 6).unwrap();

        for cmd in &cmds {
            editor.execute(view, *cmd).unwrap();
        }
        for _ in 0..=cmds.len() {
            editor.execute(view, Command::Undo).unwrap();
        }
        prop_assert_eq!(editor.buffer_text(buffer).unwrap(), TEXT);
    }
}

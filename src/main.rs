//! # Quill - headless editing driver
//!
//! Loads a file into a buffer, replays a script of editor commands through a
//! view and writes the resulting text out.
//!
//! ## Quick Start
//!
//! ```bash
//! # Replay a script against a file, print the result
//! cargo run -- notes.txt --script edits.txt
//!
//! # Write the result to a file, with debug logging
//! cargo run -- notes.txt --script edits.txt --output out.txt -vv
//! ```
//!
//! A script has one command per line in kebab-case (`move-cursor-next-line`,
//! `insert-rune x`, `undo`). Blank lines and lines starting with `#` are
//! skipped.

use anyhow::Context;
use clap::Parser;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use quill_core::{BufferId, BufferWords, Config, Editor};

/// Quill - replay editor commands against a file
#[derive(Parser, Debug)]
#[command(name = "quill")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// File to open (an empty buffer when omitted)
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Command script to replay
    #[arg(short, long, value_name = "PATH")]
    script: Option<PathBuf>,

    /// Viewport width in columns
    #[arg(long, default_value_t = 80)]
    width: usize,

    /// Viewport height in rows, status line included
    #[arg(long, default_value_t = 25)]
    height: usize,

    /// Where to write the final text (stdout when omitted)
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Config file to use instead of the default location
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let log_level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    // RUST_LOG wins over -v when it is set
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.as_str().to_lowercase()));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_writer(io::stderr),
        )
        .with(filter)
        .init();
}

fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    match path {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("failed to load config from {}", path.display())),
        None => Ok(Config::load()),
    }
}

fn open(editor: &mut Editor, file: Option<&Path>) -> anyhow::Result<BufferId> {
    match file {
        Some(path) if path.exists() => editor
            .open_file(path)
            .with_context(|| format!("failed to open {}", path.display())),
        Some(path) => {
            tracing::info!(path = %path.display(), "file does not exist, starting empty");
            let name = path
                .file_name()
                .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
            Ok(editor.open_reader(&name, io::empty())?)
        }
        None => Ok(editor.new_buffer()),
    }
}

fn write_output(editor: &Editor, id: BufferId, output: Option<&Path>) -> anyhow::Result<()> {
    let buffer = editor.buffer(id)?;
    match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            buffer.write_to(&mut writer)?;
            writer.flush()?;
        }
        None => {
            let stdout = io::stdout();
            let mut writer = stdout.lock();
            buffer.write_to(&mut writer)?;
            writer.flush()?;
        }
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    tracing::info!("Starting Quill v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config(args.config.as_deref())?;
    let mut editor = Editor::with_config(config);
    editor.set_completion_source(Box::new(BufferWords));

    let buffer = open(&mut editor, args.file.as_deref())?;
    let view = editor.new_view(buffer, args.width, args.height)?;
    editor.activate_view(view)?;

    if let Some(path) = &args.script {
        let script = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read script {}", path.display()))?;
        let count = editor
            .run_script(view, &script)
            .with_context(|| format!("script {} failed", path.display()))?;
        tracing::info!(commands = count, "script finished");
    }

    for message in editor.take_status() {
        tracing::debug!(%message, "status");
    }

    write_output(&editor, buffer, args.output.as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_parsing() {
        let args = Args::parse_from(["quill"]);
        assert!(args.file.is_none());
        assert!(args.script.is_none());
        assert_eq!((args.width, args.height), (80, 25));
        assert_eq!(args.verbose, 0);
    }

    #[test]
    fn test_args_with_file_and_script() {
        let args = Args::parse_from([
            "quill", "notes.txt", "--script", "edits.txt", "--width", "40", "-vv",
        ]);
        assert_eq!(args.file, Some(PathBuf::from("notes.txt")));
        assert_eq!(args.script, Some(PathBuf::from("edits.txt")));
        assert_eq!(args.width, 40);
        assert_eq!(args.verbose, 2);
    }

    #[test]
    fn test_open_missing_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("new.txt");
        let mut editor = Editor::new();

        let id = open(&mut editor, Some(&path)).unwrap();
        assert_eq!(editor.buffer_text(id).unwrap(), "");
        assert_eq!(editor.buffer(id).unwrap().name(), "new.txt");
    }

    #[test]
    fn test_script_replay_writes_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.txt");
        let output = dir.path().join("out.txt");
        std::fs::write(&input, "hello\nworld").unwrap();

        let mut editor = Editor::new();
        let id = open(&mut editor, Some(&input)).unwrap();
        let view = editor.new_view(id, 80, 25).unwrap();
        let script = "# shout\nmove-cursor-end-of-line\ninsert-rune !\n\nmove-cursor-next-line\nmove-cursor-beginning-of-line\nkill-line\n";
        assert_eq!(editor.run_script(view, script).unwrap(), 5);

        write_output(&editor, id, Some(&output)).unwrap();
        assert_eq!(std::fs::read_to_string(&output).unwrap(), "hello!\n");
    }
}

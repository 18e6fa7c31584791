//! Benchmarks for buffer and view operations.
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use quill_buffer::{find_closest_offsets, Buffer, Cursor};
use quill_core::{Command, Editor};

/// Generates a large text string for benchmarking.
fn generate_large_text(lines: usize) -> String {
    (0..lines)
        .map(|i| format!("Line {}: This is a sample line of text for benchmarking purposes.\n", i))
        .collect()
}

fn middle(buffer: &Buffer) -> Cursor {
    let line_num = (buffer.len_lines() / 2).max(1);
    let line = buffer.lines().nth(line_num).unwrap_or_else(|| buffer.lines().first());
    Cursor::new(line, line_num, 4)
}

/// Benchmarks loading from a byte stream.
fn bench_buffer_loading(c: &mut Criterion) {
    let mut group = c.benchmark_group("buffer_loading");

    for size in [100, 1000, 10000, 100000].iter() {
        let text = generate_large_text(*size);

        group.bench_with_input(BenchmarkId::new("from_reader", size), &text, |b, text| {
            b.iter(|| {
                let buffer = Buffer::from_reader(black_box(text.as_bytes())).unwrap();
                black_box(buffer)
            })
        });
    }

    group.finish();
}

/// Benchmarks insertion at various positions.
fn bench_insertion(c: &mut Criterion) {
    let mut group = c.benchmark_group("insertion");

    let base_text = generate_large_text(10000);

    group.bench_function("insert_at_start", |b| {
        b.iter_with_setup(
            || Buffer::from(base_text.as_str()),
            |mut buffer| {
                let at = buffer.start_cursor();
                buffer.open_action_group(at);
                buffer.insert(at, black_box(b"inserted text".to_vec()), &mut ());
                black_box(buffer)
            },
        )
    });

    group.bench_function("insert_lines_at_middle", |b| {
        b.iter_with_setup(
            || Buffer::from(base_text.as_str()),
            |mut buffer| {
                let at = middle(&buffer);
                buffer.open_action_group(at);
                buffer.insert(at, black_box(b"one\ntwo\nthree".to_vec()), &mut ());
                black_box(buffer)
            },
        )
    });

    group.bench_function("insert_at_end", |b| {
        b.iter_with_setup(
            || Buffer::from(base_text.as_str()),
            |mut buffer| {
                let at = buffer.end_cursor();
                buffer.open_action_group(at);
                buffer.insert(at, black_box(b"inserted text".to_vec()), &mut ());
                black_box(buffer)
            },
        )
    });

    group.finish();
}

/// Benchmarks deletion operations.
fn bench_deletion(c: &mut Criterion) {
    let mut group = c.benchmark_group("deletion");

    let base_text = generate_large_text(10000);

    group.bench_function("delete_at_start", |b| {
        b.iter_with_setup(
            || Buffer::from(base_text.as_str()),
            |mut buffer| {
                let at = buffer.start_cursor();
                buffer.open_action_group(at);
                buffer.delete(at, 100, &mut ());
                black_box(buffer)
            },
        )
    });

    group.bench_function("delete_across_lines", |b| {
        b.iter_with_setup(
            || Buffer::from(base_text.as_str()),
            |mut buffer| {
                let at = middle(&buffer);
                buffer.open_action_group(at);
                buffer.delete(at, 1000, &mut ());
                black_box(buffer)
            },
        )
    });

    group.finish();
}

/// Benchmarks undo/redo operations.
fn bench_undo_redo(c: &mut Criterion) {
    let mut group = c.benchmark_group("undo_redo");

    group.bench_function("undo_single", |b| {
        b.iter_with_setup(
            || {
                let mut buffer = Buffer::new();
                let at = buffer.start_cursor();
                buffer.open_action_group(at);
                let end = buffer.insert(at, b"test".to_vec(), &mut ());
                buffer.finalize_action_group(end);
                buffer
            },
            |mut buffer| {
                let at = buffer.end_cursor();
                buffer.undo(at, &mut ());
                black_box(buffer)
            },
        )
    });

    group.bench_function("undo_100_groups", |b| {
        b.iter_with_setup(
            || {
                let mut buffer = Buffer::new();
                for _ in 0..100 {
                    let at = buffer.end_cursor();
                    buffer.open_action_group(at);
                    let end = buffer.insert(at, b"test\n".to_vec(), &mut ());
                    buffer.finalize_action_group(end);
                }
                buffer
            },
            |mut buffer| {
                for _ in 0..100 {
                    let at = buffer.end_cursor();
                    buffer.undo(at, &mut ());
                }
                black_box(buffer)
            },
        )
    });

    group.finish();
}

/// Benchmarks visual column arithmetic.
fn bench_offsets(c: &mut Criterion) {
    let mut group = c.benchmark_group("offsets");

    let line = "\tfn main() {\t// comment with\ttabs and ünïcödé".repeat(8);

    group.bench_function("find_closest_offsets", |b| {
        b.iter(|| {
            let o = find_closest_offsets(black_box(line.as_bytes()), black_box(200), 8);
            black_box(o)
        })
    });

    group.finish();
}

/// Benchmarks commands running through views.
fn bench_view_commands(c: &mut Criterion) {
    let mut group = c.benchmark_group("view_commands");

    let text = generate_large_text(10000);

    group.bench_function("scroll_through_file", |b| {
        b.iter_with_setup(
            || {
                let mut editor = Editor::new();
                let buffer = editor.open_reader("bench", text.as_bytes()).unwrap();
                let view = editor.new_view(buffer, 80, 25).unwrap();
                (editor, view)
            },
            |(mut editor, view)| {
                for _ in 0..1000 {
                    editor.execute(view, Command::MoveCursorNextLine).unwrap();
                }
                black_box(editor)
            },
        )
    });

    group.bench_function("type_with_four_views", |b| {
        b.iter_with_setup(
            || {
                let mut editor = Editor::new();
                let buffer = editor.open_reader("bench", text.as_bytes()).unwrap();
                let view = editor.new_view(buffer, 80, 25).unwrap();
                for _ in 0..3 {
                    editor.new_view(buffer, 80, 25).unwrap();
                }
                (editor, view)
            },
            |(mut editor, view)| {
                for r in "hello world\n".chars().cycle().take(240) {
                    editor.execute(view, Command::InsertRune(r)).unwrap();
                }
                black_box(editor)
            },
        )
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_buffer_loading,
    bench_insertion,
    bench_deletion,
    bench_undo_redo,
    bench_offsets,
    bench_view_commands,
);

criterion_main!(benches);

//! Criterion benchmarks for the event mailbox.
//!
//! `deposit` runs inside the OS hook callback, so its cost bounds how long
//! every keystroke is held up on the pump thread.  These benchmarks measure
//! the uncontended deposit path, a deposit/take pair, and key-name parsing.
//!
//! Run with:
//! ```bash
//! cargo bench --package keybridge-core --bench mailbox_bench
//! ```

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use keybridge_core::{parse_input, EventMailbox, InputEvent};

// ── Benchmarks: mailbox ──────────────────────────────────────────────────────

fn bench_deposit(c: &mut Criterion) {
    let mut group = c.benchmark_group("mailbox");
    let mailbox = EventMailbox::new();

    // Slot stays full after the first iteration: measures the overwrite path.
    group.bench_function("deposit_overwrite", |b| {
        b.iter(|| mailbox.deposit(black_box(InputEvent::key_down(0x41))))
    });

    group.bench_function("deposit_then_take", |b| {
        b.iter(|| {
            mailbox.deposit(black_box(InputEvent::key_up(0x41)));
            black_box(mailbox.take_next())
        })
    });

    group.finish();
}

// ── Benchmarks: key names ────────────────────────────────────────────────────

fn bench_parse_input(c: &mut Criterion) {
    let mut group = c.benchmark_group("keymap_names");

    group.bench_function("parse_single_letter", |b| {
        b.iter(|| parse_input(black_box("a")))
    });

    group.bench_function("parse_modifier_with_suffix", |b| {
        b.iter(|| parse_input(black_box("right shift up")))
    });

    group.finish();
}

criterion_group!(benches, bench_deposit, bench_parse_input);
criterion_main!(benches);

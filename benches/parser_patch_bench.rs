use std::hint::black_box;
use std::mem::size_of;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use termcore::{Cell, Parser, Scrollback, ScrollbackLine, Terminal};

fn fnv1a64(bytes: &[u8]) -> u64 {
    const FNV_OFFSET: u64 = 0xcbf29ce484222325;
    const FNV_PRIME: u64 = 0x100000001b3;
    let mut hash = FNV_OFFSET;
    for &b in bytes {
        hash ^= u64::from(b);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

struct Corpus<'a> {
    id: &'a str,
    bytes: &'a [u8],
}

fn corpora() -> Vec<Corpus<'static>> {
    const BUILD_LOG: &[u8] = br#"Compiling termcore v0.1.0 (/repo/termcore)
Compiling ftui-core v0.1.1 (/repo/crates/ftui-core)
Finished dev [unoptimized + debuginfo] target(s) in 0.73s
"#;

    const DENSE_SGR: &[u8] = b"\x1b[31mRED\x1b[0m \x1b[32mGREEN\x1b[0m \x1b[33mYELLOW\x1b[0m\n\
\x1b[38;5;196mIDX196\x1b[0m \x1b[38;2;1;2;3mRGB\x1b[0m\n";

    const MARKDOWNISH: &[u8] = br#"# Title
- item one
- item two

```rust
println!("hello");
```
"#;

    const UNICODE_HEAVY: &[u8] =
        "unicode: cafe \u{2014} \u{4f60}\u{597d} \u{2014} \u{1f600}\nline2: e\u{301}\n".as_bytes();

    vec![
        Corpus { id: "build_log_v1", bytes: BUILD_LOG },
        Corpus { id: "dense_sgr_v1", bytes: DENSE_SGR },
        Corpus { id: "markdownish_v1", bytes: MARKDOWNISH },
        Corpus { id: "unicode_heavy_v1", bytes: UNICODE_HEAVY },
    ]
}

/// Repeat base patterns out to ~64 KB for more stable throughput numbers
/// than the small corpora give.
fn large_corpora() -> Vec<(&'static str, Vec<u8>)> {
    let sgr_line = b"\x1b[1;32m   Compiling\x1b[0m termcore v0.1.0 \
\x1b[2m(/repo/termcore)\x1b[0m\r\n\
\x1b[1;33mwarning\x1b[0m: unused variable `\x1b[1mx\x1b[0m`\r\n\
 \x1b[1;34m-->\x1b[0m src/lib.rs:42:9\r\n";
    let sgr_stream = sgr_line.repeat(64 * 1024 / sgr_line.len());

    let cursor_line = b"\x1b[1;1H\x1b[2J\x1b[1;1HABCDEFGHIJ\
\x1b[2;1HKLMNOPQRST\x1b[3;1H0123456789\
\x1b[1;5H\x1b[0K\x1b[3;8H\x1b[1P\x1b[2;3H\x1b[2@  ";
    let cursor_stream = cursor_line.repeat(64 * 1024 / cursor_line.len());

    let utf8_line =
        "\u{4f60}\u{597d}\u{4e16}\u{754c} cafe resume \u{2014} line of text \u{65e5}\u{672c}\u{8a9e}\r\n"
            .as_bytes();
    let utf8_stream = utf8_line.repeat(64 * 1024 / utf8_line.len());

    let ascii_line = b"The quick brown fox jumps over the lazy dog. 0123456789 ABCDEF\r\n";
    let ascii_stream = ascii_line.repeat(64 * 1024 / ascii_line.len());

    vec![
        ("sgr_64k_v1", sgr_stream),
        ("cursor_64k_v1", cursor_stream),
        ("utf8_64k_v1", utf8_stream),
        ("ascii_64k_v1", ascii_stream),
    ]
}

fn make_row(cols: u16, seed: u32) -> Vec<Cell> {
    (0..cols)
        .map(|col| Cell::new((b'a' + ((seed + u32::from(col)) % 26) as u8) as char))
        .collect()
}

fn build_scrollback(lines: usize, cols: u16) -> Scrollback {
    let mut scrollback = Scrollback::new(lines);
    for i in 0..lines {
        let row = make_row(cols, i as u32);
        let _ = scrollback.push_row(&row, i % 3 == 0);
    }
    scrollback
}

/// Lower-bound estimate of scrollback heap footprint. Excludes VecDeque
/// spare capacity and allocator metadata, but is deterministic enough for
/// tracking regressions across runs.
fn estimate_scrollback_heap_bytes(scrollback: &Scrollback) -> usize {
    let line_headers = scrollback.len() * size_of::<ScrollbackLine>();
    let cell_storage: usize = scrollback.iter().map(|line| line.len() * size_of::<Cell>()).sum();
    line_headers + cell_storage
}

fn scrollback_memory_bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("scrollback_memory");
    let line_count = 1_000usize;

    for cols in [80u16, 120u16, 200u16] {
        let scrollback = build_scrollback(line_count, cols);
        let bytes = estimate_scrollback_heap_bytes(&scrollback);
        eprintln!(
            "{{\"event\":\"scrollback_memory\",\"lines\":{},\"cols\":{},\"heap_bytes\":{},\"bytes_per_line\":{}}}",
            line_count,
            cols,
            bytes,
            bytes / line_count
        );

        let id = format!("estimate_bytes_1k_{cols}cols");
        group.bench_function(BenchmarkId::from_parameter(id), |b| {
            b.iter(|| {
                let est = estimate_scrollback_heap_bytes(black_box(&scrollback));
                black_box(est);
            });
        });
    }

    group.finish();
}

fn parser_throughput_bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("parser_throughput");
    for corpus in corpora() {
        let hash = fnv1a64(corpus.bytes);
        eprintln!(
            "[termcore bench] corpus={} bytes={} fnv1a64={:016x}",
            corpus.id,
            corpus.bytes.len(),
            hash
        );

        group.throughput(Throughput::Bytes(corpus.bytes.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("feed_vec", corpus.id),
            &corpus.bytes,
            |b, bytes| {
                let mut parser = Parser::new();
                b.iter(|| {
                    let actions = parser.feed(black_box(bytes));
                    black_box(actions.len());
                });
            },
        );
    }
    group.finish();
}

fn parser_throughput_large_bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("parser_throughput_large");
    for (id, bytes) in large_corpora() {
        let hash = fnv1a64(&bytes);
        eprintln!("[termcore bench] corpus={} bytes={} fnv1a64={:016x}", id, bytes.len(), hash);

        group.throughput(Throughput::Bytes(bytes.len() as u64));
        group.bench_with_input(BenchmarkId::new("feed_vec", id), &bytes, |b, bytes| {
            let mut parser = Parser::new();
            b.iter(|| {
                let actions = parser.feed(black_box(bytes));
                black_box(actions.len());
            });
        });
    }
    group.finish();
}

/// End-to-end cost: parse, interpret, and drain damage for a terminal-sized
/// viewport, as a host embedding this crate in a render loop would.
fn full_pipeline_bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_pipeline");
    for (id, bytes) in large_corpora() {
        group.throughput(Throughput::Bytes(bytes.len() as u64));
        group.bench_with_input(BenchmarkId::new("feed_and_take_damage", id), &bytes, |b, bytes| {
            b.iter(|| {
                let mut term = Terminal::new(120, 40, 512).unwrap();
                term.feed(black_box(bytes));
                let patch = term.take_damage();
                black_box(patch);
            });
        });
    }
    group.finish();
}

fn parser_action_mix_bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("parser_action_mix");

    let stream = b"ab\x08c\tZ\x1b[2;3HX\x1b[2J\x1b[1;4H\x1b[0K!\n";
    group.throughput(Throughput::Bytes(stream.len() as u64));

    group.bench_function("feed_actions", |b| {
        let mut parser = Parser::new();
        b.iter(|| {
            let actions = parser.feed(black_box(stream));
            black_box(actions.len());
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    parser_throughput_bench,
    scrollback_memory_bench,
    parser_throughput_large_bench,
    full_pipeline_bench,
    parser_action_mix_bench,
);
criterion_main!(benches);

//! Performance benchmarks for blockmark
//!
//! Run with: cargo bench

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

/// Sample Markdown documents of various sizes
mod samples {
    pub const TINY: &str = "# Hello\n\nWorld.\n";

    pub const SMALL: &str = r#"# Heading

This is a paragraph spanning
two source lines.

- Item 1
- Item 2
- Item 3

    indented code
"#;

    pub const MEDIUM: &str = r#"# Project README

This is a sample README file that demonstrates various block structures.

## Features

- Fast parsing
- Rule-driven dispatch
- Nested containers

### Code Example

```rust
fn main() {
    println!("Hello, world!");
}
```

## Notes

> A blockquote that spans
> multiple lines.

[docs]: https://docs.rs "Documentation"

### Sections

1. First
2. Second
   - Nested

## Conclusion

Thank you for reading!
"#;

    /// Generate a large document by repeating sections
    pub fn large() -> String {
        let section = r#"
## Section Title

This paragraph carries several source lines of plain
text so paragraph merging gets exercised along with
everything else.

- First bullet point
- Second bullet point
- Third point with more words

> A blockquote that spans
> multiple lines.

```rust
fn example() {
    let x = 42;
    println!("{}", x);
}
```

Another paragraph to add some content. This helps test the parser's ability
to handle longer documents efficiently.

"#;
        section.repeat(50)
    }

    /// Deeply nested quote markers
    pub fn deep_quotes(depth: usize) -> String {
        "> ".repeat(depth) + "deep\n"
    }

    /// A long run of sibling list items
    pub fn long_list() -> String {
        "- item\n".repeat(1000)
    }

    /// Marker-free lines that merge into one huge paragraph
    pub fn giant_paragraph() -> String {
        "just some plain text\n".repeat(5000)
    }

    /// A wall of link reference definitions
    pub fn many_definitions() -> String {
        let mut out = String::new();
        for i in 0..500 {
            out.push_str(&format!("[ref-{i}]: /url/{i} \"title {i}\"\n"));
        }
        out
    }
}

fn parse(input: &str) -> usize {
    blockmark::parse_blocks::<()>(input).tokens().len()
}

fn bench_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("parsing");

    group.throughput(Throughput::Bytes(samples::TINY.len() as u64));
    group.bench_function("tiny", |b| b.iter(|| parse(black_box(samples::TINY))));

    group.throughput(Throughput::Bytes(samples::SMALL.len() as u64));
    group.bench_function("small", |b| b.iter(|| parse(black_box(samples::SMALL))));

    group.throughput(Throughput::Bytes(samples::MEDIUM.len() as u64));
    group.bench_function("medium", |b| b.iter(|| parse(black_box(samples::MEDIUM))));

    let large = samples::large();
    group.throughput(Throughput::Bytes(large.len() as u64));
    group.bench_function("large", |b| b.iter(|| parse(black_box(&large))));

    group.finish();
}

fn bench_pathological(c: &mut Criterion) {
    let mut group = c.benchmark_group("pathological");
    group.sample_size(20); // Fewer samples for slow cases

    for depth in [10usize, 50, 100] {
        let input = samples::deep_quotes(depth);
        group.throughput(Throughput::Bytes(input.len() as u64));
        group.bench_with_input(BenchmarkId::new("deep_quotes", depth), &input, |b, s| {
            b.iter(|| parse(black_box(s)))
        });
    }

    let list = samples::long_list();
    group.throughput(Throughput::Bytes(list.len() as u64));
    group.bench_function("long_list", |b| b.iter(|| parse(black_box(&list))));

    let paragraph = samples::giant_paragraph();
    group.throughput(Throughput::Bytes(paragraph.len() as u64));
    group.bench_function("giant_paragraph", |b| {
        b.iter(|| parse(black_box(&paragraph)))
    });

    let defs = samples::many_definitions();
    group.throughput(Throughput::Bytes(defs.len() as u64));
    group.bench_function("many_definitions", |b| b.iter(|| parse(black_box(&defs))));

    group.finish();
}

fn bench_walk(c: &mut Criterion) {
    let mut group = c.benchmark_group("walk");

    let input = samples::MEDIUM;
    group.throughput(Throughput::Bytes(input.len() as u64));

    // Block pass alone
    group.bench_function("tokens_only", |b| {
        b.iter(|| blockmark::parse_blocks::<String>(black_box(input)))
    });

    // Block pass plus the walk with a trivial inline stage
    group.bench_function("with_walk", |b| {
        b.iter(|| {
            blockmark::parse_blocks::<String>(black_box(input))
                .into_tokens(|text, _env| vec![text.to_string()])
        })
    });

    group.finish();
}

criterion_group!(benches, bench_parsing, bench_pathological, bench_walk);
criterion_main!(benches);

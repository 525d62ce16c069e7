//! Comparison benchmarks: blockmark vs other Rust Markdown parsers
//!
//! Run with: cargo bench --bench comparison
//!
//! Parsers compared:
//! - blockmark (this crate, block structure only)
//! - pulldown-cmark (most popular, used by rustdoc)
//! - comrak (100% CommonMark compliant)
//!
//! The competitors also run their inline passes, so absolute numbers are
//! not apples to apples; the point is tracking relative movement across
//! document shapes.

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

/// Sample documents for benchmarking
mod samples {
    /// Tiny document - baseline measurement
    pub const TINY: &str = "# Hello\n\nWorld.\n";

    /// Small README-style document
    pub const SMALL: &str = r#"# Heading

This is a paragraph spanning
two source lines.

- Item 1
- Item 2
- Item 3

    indented code
"#;

    /// Medium-sized README
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

## Conclusion

Thank you for reading!
"#;

    /// Simple document: headings, lists, paragraphs
    pub const SIMPLE: &str = r#"# Title

## Section A

This is a plain paragraph.

- Item one
- Item two
- Item three

Another paragraph.
"#;

    /// Reference link definitions
    pub const REFS: &str = r#"[ref-1]: https://example.com "Example"
[ref-2]: /relative/path 'Rel'

This paragraph sits between definitions.

[ref-3]: /third
"#;

    /// Nested lists and mixed block elements
    pub const LISTS: &str = r#"# Lists

1. Ordered
   1. Nested ordered
   2. Nested ordered
2. Ordered
   - Nested unordered
     - Deep nested

> Blockquote
> - Quoted list item
>   - Nested in quote
"#;

    /// HTML blocks
    pub const HTML: &str = r#"<div class="note">
<p>A block of raw HTML.</p>
</div>

Paragraph between blocks.

<script>
var x = 1;
</script>
"#;

    /// Mixed realistic document
    pub const MIXED: &str = r#"# Mixed Sample

Intro paragraph over
two lines.

[ref]: https://example.com "Title"

## Section

> Blockquote with
> a second line.

- List item one
- List item two

```rust
fn example() {
    println!("Hello");
}
```

Paragraph after code.
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
}

/// Parse with blockmark
fn parse_blockmark(input: &str) -> usize {
    blockmark::parse_blocks::<()>(input).tokens().len()
}

/// Parse with pulldown-cmark, draining the event stream
fn parse_pulldown_cmark(input: &str) -> usize {
    pulldown_cmark::Parser::new(input).count()
}

/// Parse with comrak to its AST
fn parse_comrak(input: &str) -> usize {
    let arena = comrak::Arena::new();
    let root = comrak::parse_document(&arena, input, &comrak::Options::default());
    root.children().count()
}

fn bench_tiny(c: &mut Criterion) {
    let mut group = c.benchmark_group("tiny");
    let input = samples::TINY;
    group.throughput(Throughput::Bytes(input.len() as u64));

    group.bench_function("blockmark", |b| {
        b.iter(|| parse_blockmark(black_box(input)))
    });
    group.bench_function("pulldown-cmark", |b| {
        b.iter(|| parse_pulldown_cmark(black_box(input)))
    });
    group.bench_function("comrak", |b| b.iter(|| parse_comrak(black_box(input))));

    group.finish();
}

fn bench_small(c: &mut Criterion) {
    let mut group = c.benchmark_group("small");
    let input = samples::SMALL;
    group.throughput(Throughput::Bytes(input.len() as u64));

    group.bench_function("blockmark", |b| {
        b.iter(|| parse_blockmark(black_box(input)))
    });
    group.bench_function("pulldown-cmark", |b| {
        b.iter(|| parse_pulldown_cmark(black_box(input)))
    });
    group.bench_function("comrak", |b| b.iter(|| parse_comrak(black_box(input))));

    group.finish();
}

fn bench_medium(c: &mut Criterion) {
    let mut group = c.benchmark_group("medium");
    let input = samples::MEDIUM;
    group.throughput(Throughput::Bytes(input.len() as u64));

    group.bench_function("blockmark", |b| {
        b.iter(|| parse_blockmark(black_box(input)))
    });
    group.bench_function("pulldown-cmark", |b| {
        b.iter(|| parse_pulldown_cmark(black_box(input)))
    });
    group.bench_function("comrak", |b| b.iter(|| parse_comrak(black_box(input))));

    group.finish();
}

fn bench_large(c: &mut Criterion) {
    let mut group = c.benchmark_group("large");
    let input = samples::large();
    group.throughput(Throughput::Bytes(input.len() as u64));

    group.bench_function("blockmark", |b| {
        b.iter(|| parse_blockmark(black_box(&input)))
    });
    group.bench_function("pulldown-cmark", |b| {
        b.iter(|| parse_pulldown_cmark(black_box(&input)))
    });
    group.bench_function("comrak", |b| b.iter(|| parse_comrak(black_box(&input))));

    group.finish();
}

/// Complexity comparison across representative feature sets
fn bench_complexity(c: &mut Criterion) {
    let mut group = c.benchmark_group("complexity");

    let cases: Vec<(&str, &str)> = vec![
        ("simple", samples::SIMPLE),
        ("refs", samples::REFS),
        ("lists", samples::LISTS),
        ("html", samples::HTML),
        ("mixed", samples::MIXED),
    ];

    for (name, input) in &cases {
        group.throughput(Throughput::Bytes(input.len() as u64));

        group.bench_with_input(BenchmarkId::new("blockmark", name), input, |b, s| {
            b.iter(|| parse_blockmark(black_box(s)))
        });
        group.bench_with_input(BenchmarkId::new("pulldown-cmark", name), input, |b, s| {
            b.iter(|| parse_pulldown_cmark(black_box(s)))
        });
        group.bench_with_input(BenchmarkId::new("comrak", name), input, |b, s| {
            b.iter(|| parse_comrak(black_box(s)))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_tiny,
    bench_small,
    bench_medium,
    bench_large,
    bench_complexity
);
criterion_main!(benches);

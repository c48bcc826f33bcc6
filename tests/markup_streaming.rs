//! Chunking-independence tests for the streaming markup reconstructor.
//!
//! However a transport splits the model output, the concatenated HTML after
//! `flush()` must be identical.

use groundline::StreamingMarkupReconstructor;
use groundline::generator::word_deltas;

const SAMPLES: &[&str] = &[
    "Paris is the **capital** of France.\n",
    "## Overview\n**Key:** value with *emphasis* and 2 * 3 = 6\n",
    "- first item\n* second **bold** item\n• third\n\nAfter the list.",
    "See [the docs](https://docs.rs/serde) and [Rust](https://www.rust-lang.org/).\n",
    "```rust\nfn main() { println!(\"<hi>\"); }\n```\nDone & dusted.\n",
    "Unclosed **bold and *italic at the end",
    "A [dangling link](https://example.com/pa",
    "[x](javascript:alert(1)) stays literal\n",
    "Tricky ***triple*** and **a *b** c* markers\n",
    "Multi\nline\n\n\nparagraphs with `inline` ticks\n",
    "",
];

fn render_in_chunks(input: &str, chunks: impl IntoIterator<Item = String>) -> String {
    let mut reconstructor = StreamingMarkupReconstructor::new();
    let mut out = String::new();
    for chunk in chunks {
        out.push_str(&reconstructor.push(&chunk));
    }
    out.push_str(&reconstructor.flush());
    assert_eq!(
        reconstructor.flush(),
        "",
        "second flush must be empty for {input:?}"
    );
    out
}

fn whole(input: &str) -> String {
    render_in_chunks(input, [input.to_string()])
}

fn char_by_char(input: &str) -> String {
    render_in_chunks(input, input.chars().map(String::from))
}

fn fixed_size(input: &str, size: usize) -> String {
    let chars: Vec<char> = input.chars().collect();
    render_in_chunks(input, chars.chunks(size).map(|c| c.iter().collect()))
}

#[test]
fn char_by_char_matches_single_chunk() {
    for sample in SAMPLES {
        assert_eq!(char_by_char(sample), whole(sample), "sample {sample:?}");
    }
}

#[test]
fn word_chunks_match_single_chunk() {
    for sample in SAMPLES {
        assert_eq!(
            render_in_chunks(sample, word_deltas(sample)),
            whole(sample),
            "sample {sample:?}"
        );
    }
}

#[test]
fn fixed_size_chunks_match_single_chunk() {
    for sample in SAMPLES {
        let expected = whole(sample);
        for size in [2, 3, 5, 7] {
            assert_eq!(fixed_size(sample, size), expected, "sample {sample:?}, size {size}");
        }
    }
}

#[test]
fn empty_deltas_are_harmless() {
    let sample = "Some **bold** text\n";
    let chunks = sample
        .chars()
        .flat_map(|c| [String::new(), c.to_string()])
        .collect::<Vec<_>>();
    assert_eq!(render_in_chunks(sample, chunks), whole(sample));
}

#[test]
fn output_never_contains_raw_angle_brackets_from_input() {
    for sample in SAMPLES {
        let html = whole(sample);
        assert!(!html.contains("<hi>"), "unescaped input in {html:?}");
        assert!(!html.contains("javascript:alert(1)\""), "script href in {html:?}");
    }
}

#[test]
fn tags_are_balanced_after_flush() {
    for sample in SAMPLES {
        let html = char_by_char(sample);
        for tag in ["strong", "em", "p", "li", "a", "code"] {
            let opens = html.matches(&format!("<{tag}>")).count()
                + html.matches(&format!("<{tag} ")).count();
            let closes = html.matches(&format!("</{tag}>")).count();
            assert_eq!(opens, closes, "unbalanced <{tag}> in {html:?}");
        }
    }
}

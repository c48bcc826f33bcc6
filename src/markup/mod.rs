//! Markup handling for generated answers.
//!
//! [`stream`] turns the generator's text deltas into HTML fragments as they
//! arrive. [`render`] produces the final HTML body from the complete answer.

pub mod render;
pub mod stream;

pub use render::{clean_markdown, render_html};
pub use stream::StreamingMarkupReconstructor;

/// Escape text for HTML element content and attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        push_escaped(&mut out, c);
    }
    out
}

pub(crate) fn push_escaped(out: &mut String, c: char) {
    match c {
        '&' => out.push_str("&amp;"),
        '<' => out.push_str("&lt;"),
        '>' => out.push_str("&gt;"),
        '"' => out.push_str("&quot;"),
        '\'' => out.push_str("&#x27;"),
        _ => out.push(c),
    }
}

/// Whether a link target may be rendered as an `href`.
///
/// Script-capable schemes are refused, including when disguised with
/// embedded whitespace or control characters.
pub fn is_safe_href(url: &str) -> bool {
    let compact: String = url
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect::<String>()
        .to_ascii_lowercase();
    !(compact.starts_with("javascript:")
        || compact.starts_with("vbscript:")
        || compact.starts_with("data:"))
}

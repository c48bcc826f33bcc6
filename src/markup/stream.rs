//! Incremental markdown-to-HTML reconstruction for streamed answers.
//!
//! Deltas are fed in order through [`StreamingMarkupReconstructor::push`],
//! which returns whatever HTML can be emitted so far. Output depends only on
//! the concatenated input, never on where the transport split it: a marker
//! that needs lookahead (`*` vs `**`, a backtick fence, `](`) is held back
//! until the next delta or [`flush`](StreamingMarkupReconstructor::flush).
//!
//! Literal text is always HTML-escaped. Each line is wrapped in `<p>` or,
//! when it starts with a bullet marker, `<li>`; inline tags still open at
//! the end of a line are closed there, so every line is well-formed.

use super::{is_safe_href, push_escaped};

const LIST_MARKERS: &[char] = &['*', '-', '•', '●', '○'];
const FENCE: &str = "```";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Inline {
    Strong,
    Emphasis,
}

impl Inline {
    fn open_tag(self) -> &'static str {
        match self {
            Self::Strong => "<strong>",
            Self::Emphasis => "<em>",
        }
    }

    fn close_tag(self) -> &'static str {
        match self {
            Self::Strong => "</strong>",
            Self::Emphasis => "</em>",
        }
    }
}

#[derive(Debug, Default)]
enum LinkState {
    #[default]
    Idle,
    Text(String),
    Url { text: String, url: String },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum LineWrapper {
    /// Nothing on the line yet but indentation.
    #[default]
    Start,
    /// Fence and code lines carry no wrapper.
    Bare,
    Paragraph,
    ListItem,
}

/// Converts an ordered stream of markdown deltas into HTML fragments.
///
/// One instance serves exactly one answer. After [`flush`](Self::flush)
/// it is reset and may be reused.
#[derive(Debug, Default)]
pub struct StreamingMarkupReconstructor {
    /// Input held back until its meaning is known.
    pending: String,
    open_inline: Vec<Inline>,
    in_code_block: bool,
    link: LinkState,
    line: LineWrapper,
    indent: String,
    skipping_marker_space: bool,
    prev: Option<char>,
}

impl StreamingMarkupReconstructor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the next delta, returning the HTML that is now certain.
    pub fn push(&mut self, delta: &str) -> String {
        self.run(delta, false)
    }

    /// End of stream: resolve held-back input and close everything open.
    ///
    /// An unfinished link is emitted as escaped literal text.
    pub fn flush(&mut self) -> String {
        let mut out = self.run("", true);
        self.abort_link(&mut out);
        self.close_inline(&mut out);
        match self.line {
            LineWrapper::Paragraph => out.push_str("</p>"),
            LineWrapper::ListItem => out.push_str("</li>"),
            LineWrapper::Start if self.in_code_block => out.push_str(&self.indent),
            LineWrapper::Start | LineWrapper::Bare => {}
        }
        *self = Self::default();
        out
    }

    /// Whether a fenced code block is currently open.
    pub fn in_code_block(&self) -> bool {
        self.in_code_block
    }

    fn run(&mut self, delta: &str, at_end: bool) -> String {
        let mut input = std::mem::take(&mut self.pending);
        input.push_str(delta);
        let chars: Vec<char> = input.chars().collect();

        let mut out = String::new();
        let mut i = 0;
        while i < chars.len() {
            match self.step(&chars[i..], at_end, &mut out) {
                Some(consumed) => i += consumed,
                None => break,
            }
        }
        self.pending = chars[i..].iter().collect();
        out
    }

    /// Consume from the front of `rest`. `None` means more input is needed.
    fn step(&mut self, rest: &[char], at_end: bool, out: &mut String) -> Option<usize> {
        let c = rest[0];

        if c == '\r' {
            return Some(1);
        }
        if c == '\n' {
            self.end_line(out);
            self.prev = Some(c);
            return Some(1);
        }

        if let Some(consumed) = self.step_link(rest, at_end, out)? {
            return Some(consumed);
        }

        if self.line == LineWrapper::Start {
            if c == ' ' || c == '\t' {
                self.indent.push(c);
                self.prev = Some(c);
                return Some(1);
            }
            if self.in_code_block {
                out.push_str(&std::mem::take(&mut self.indent));
                self.line = LineWrapper::Bare;
            } else if c == '`' && starts_with(rest, FENCE, at_end)? {
                self.indent.clear();
                self.line = LineWrapper::Bare;
            } else if LIST_MARKERS.contains(&c)
                && next_char(rest, at_end)?.is_some_and(|n| n == ' ' || n == '\t')
            {
                self.indent.clear();
                self.line = LineWrapper::ListItem;
                self.skipping_marker_space = true;
                self.prev = Some(c);
                out.push_str("<li>");
                return Some(1);
            } else {
                self.indent.clear();
                self.line = LineWrapper::Paragraph;
                out.push_str("<p>");
            }
        }

        if self.skipping_marker_space {
            if c == ' ' || c == '\t' {
                self.prev = Some(c);
                return Some(1);
            }
            self.skipping_marker_space = false;
        }

        if c == '`' && starts_with(rest, FENCE, at_end)? {
            self.in_code_block = !self.in_code_block;
            out.push_str(FENCE);
            self.prev = Some('`');
            return Some(FENCE.len());
        }

        if self.in_code_block {
            push_escaped(out, c);
            self.prev = Some(c);
            return Some(1);
        }

        if c == '*' {
            if starts_with(rest, "**", at_end)? {
                self.toggle(Inline::Strong, out);
                self.prev = Some('*');
                return Some(2);
            }
            let next = next_char(rest, at_end)?;
            let after_space = self.prev.is_none_or(char::is_whitespace);
            let emphasis_open = self.open_inline.contains(&Inline::Emphasis);
            if (emphasis_open && !after_space)
                || (!emphasis_open && after_space && next.is_some_and(|n| !n.is_whitespace()))
            {
                self.toggle(Inline::Emphasis, out);
            } else {
                out.push('*');
            }
            self.prev = Some(c);
            return Some(1);
        }

        if c == '[' {
            self.link = LinkState::Text(String::new());
            self.prev = Some(c);
            return Some(1);
        }

        push_escaped(out, c);
        self.prev = Some(c);
        Some(1)
    }

    /// Link capture. `Some(None)` when no link is being captured.
    fn step_link(&mut self, rest: &[char], at_end: bool, out: &mut String) -> Option<Option<usize>> {
        let c = rest[0];
        match &mut self.link {
            LinkState::Idle => Some(None),
            LinkState::Text(text) => {
                if c != ']' {
                    text.push(c);
                    self.prev = Some(c);
                    return Some(Some(1));
                }
                if starts_with(rest, "](", at_end)? {
                    let text = std::mem::take(text);
                    self.link = LinkState::Url {
                        text,
                        url: String::new(),
                    };
                    self.prev = Some('(');
                    return Some(Some(2));
                }
                let literal = format!("[{text}]");
                self.link = LinkState::Idle;
                push_str_escaped(out, &literal);
                self.prev = Some(c);
                Some(Some(1))
            }
            LinkState::Url { text, url } => {
                if c != ')' {
                    url.push(c);
                    self.prev = Some(c);
                    return Some(Some(1));
                }
                let anchor = render_link(text, url);
                self.link = LinkState::Idle;
                out.push_str(&anchor);
                self.prev = Some(c);
                Some(Some(1))
            }
        }
    }

    /// Open `tag`, or close it along with anything opened after it and
    /// reopen those, keeping the nesting well-formed.
    fn toggle(&mut self, tag: Inline, out: &mut String) {
        match self.open_inline.iter().position(|t| *t == tag) {
            Some(pos) => {
                let closed: Vec<Inline> = self.open_inline.drain(pos..).collect();
                for t in closed.iter().rev() {
                    out.push_str(t.close_tag());
                }
                for t in &closed[1..] {
                    out.push_str(t.open_tag());
                    self.open_inline.push(*t);
                }
            }
            None => {
                out.push_str(tag.open_tag());
                self.open_inline.push(tag);
            }
        }
    }

    fn close_inline(&mut self, out: &mut String) {
        for t in self.open_inline.drain(..).rev() {
            out.push_str(t.close_tag());
        }
    }

    fn abort_link(&mut self, out: &mut String) {
        match std::mem::take(&mut self.link) {
            LinkState::Idle => {}
            LinkState::Text(text) => push_str_escaped(out, &format!("[{text}")),
            LinkState::Url { text, url } => push_str_escaped(out, &format!("[{text}]({url}")),
        }
    }

    fn end_line(&mut self, out: &mut String) {
        self.abort_link(out);
        self.close_inline(out);
        match self.line {
            LineWrapper::Start => {
                if self.in_code_block {
                    out.push_str(&self.indent);
                }
                out.push('\n');
            }
            LineWrapper::Bare => out.push('\n'),
            LineWrapper::Paragraph => out.push_str("</p>\n"),
            LineWrapper::ListItem => out.push_str("</li>\n"),
        }
        self.indent.clear();
        self.line = LineWrapper::Start;
        self.skipping_marker_space = false;
    }
}

/// Whether `rest` starts with `pattern`; `None` if the input ends too soon
/// to tell and more may follow.
fn starts_with(rest: &[char], pattern: &str, at_end: bool) -> Option<bool> {
    for (i, expected) in pattern.chars().enumerate() {
        match rest.get(i) {
            Some(c) if *c == expected => {}
            Some(_) => return Some(false),
            None if at_end => return Some(false),
            None => return None,
        }
    }
    Some(true)
}

/// The character after the current one; `Some(None)` at end of stream.
fn next_char(rest: &[char], at_end: bool) -> Option<Option<char>> {
    match rest.get(1) {
        Some(c) => Some(Some(*c)),
        None if at_end => Some(None),
        None => None,
    }
}

fn push_str_escaped(out: &mut String, text: &str) {
    for c in text.chars() {
        push_escaped(out, c);
    }
}

fn render_link(text: &str, url: &str) -> String {
    if text.is_empty() || url.trim().is_empty() || !is_safe_href(url) {
        let mut literal = String::new();
        push_str_escaped(&mut literal, &format!("[{text}]({url})"));
        return literal;
    }
    let mut anchor = String::from("<a href=\"");
    push_str_escaped(&mut anchor, url.trim());
    anchor.push_str("\" target=\"_blank\" rel=\"noopener noreferrer\">");
    push_str_escaped(&mut anchor, text);
    anchor.push_str("</a>");
    anchor
}

#[cfg(test)]
mod tests {
    use super::*;

    fn whole(input: &str) -> String {
        let mut r = StreamingMarkupReconstructor::new();
        let mut out = r.push(input);
        out.push_str(&r.flush());
        out
    }

    #[test]
    fn paragraphs_and_bold() {
        assert_eq!(
            whole("Hello **world**\n"),
            "<p>Hello <strong>world</strong></p>\n"
        );
    }

    #[test]
    fn list_items() {
        assert_eq!(
            whole("- one\n* two\n• three\n"),
            "<li>one</li>\n<li>two</li>\n<li>three</li>\n"
        );
    }

    #[test]
    fn bold_at_line_start_is_not_a_list() {
        assert_eq!(whole("**Key:** value"), "<p><strong>Key:</strong> value</p>");
    }

    #[test]
    fn emphasis_and_literal_asterisks() {
        assert_eq!(
            whole("an *emphasis* here 2 * 3\n"),
            "<p>an <em>emphasis</em> here 2 * 3</p>\n"
        );
        assert_eq!(whole("a*b"), "<p>a*b</p>");
    }

    #[test]
    fn link_split_across_deltas() {
        let mut r = StreamingMarkupReconstructor::new();
        assert_eq!(r.push("See [Rust](https://rust-"), "<p>See ");
        assert_eq!(
            r.push("lang.org) now"),
            "<a href=\"https://rust-lang.org\" target=\"_blank\" rel=\"noopener noreferrer\">Rust</a> now"
        );
        assert_eq!(r.flush(), "</p>");
    }

    #[test]
    fn bracket_without_url_is_literal() {
        assert_eq!(whole("value [1] here"), "<p>value [1] here</p>");
    }

    #[test]
    fn script_links_are_not_rendered() {
        let out = whole("[x](javascript:alert(1))");
        assert!(!out.contains("<a "));
        assert_eq!(out, "<p>[x](javascript:alert(1))</p>");
    }

    #[test]
    fn code_blocks_pass_through_escaped() {
        assert_eq!(
            whole("```\n<b>x</b> **y**\n```\n"),
            "```\n&lt;b&gt;x&lt;/b&gt; **y**\n```\n"
        );
    }

    #[test]
    fn text_is_escaped() {
        assert_eq!(whole("a < b & c\n"), "<p>a &lt; b &amp; c</p>\n");
    }

    #[test]
    fn blank_lines_kept() {
        assert_eq!(whole("a\n\nb"), "<p>a</p>\n\n<p>b</p>");
    }

    #[test]
    fn interleaved_markers_stay_well_formed() {
        assert_eq!(
            whole("**a *b** c*\n"),
            "<p><strong>a <em>b</em></strong><em> c</em></p>\n"
        );
    }

    #[test]
    fn truncated_stream_closes_everything() {
        let mut r = StreamingMarkupReconstructor::new();
        let mut out = r.push("Some **bold [unfinished");
        assert_eq!(out, "<p>Some <strong>bold ");
        out.push_str(&r.flush());
        assert_eq!(out, "<p>Some <strong>bold [unfinished</strong></p>");
    }

    #[test]
    fn trailing_marker_waits_for_next_delta() {
        let mut r = StreamingMarkupReconstructor::new();
        assert_eq!(r.push("x *"), "<p>x ");
        assert_eq!(r.push("*y"), "<strong>y");
        assert_eq!(r.flush(), "</strong></p>");
    }

    #[test]
    fn flush_resets_state() {
        let mut r = StreamingMarkupReconstructor::new();
        r.push("```\ncode");
        assert!(r.in_code_block());
        r.flush();
        assert!(!r.in_code_block());
        assert_eq!(r.push("plain\n"), "<p>plain</p>\n");
    }
}

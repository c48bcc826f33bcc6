//! Final rendering of a complete answer.
//!
//! Generated markdown is tidied first (stray asterisks, doubled bold
//! markers, `**Section:**` lines, mixed bullet glyphs), then rendered with
//! `pulldown_cmark`. Raw HTML from the model is escaped, never passed
//! through.

use std::sync::LazyLock;

use pulldown_cmark::{CowStr, Event, Options, Parser, Tag};
use regex::Regex;

use super::{escape_html, is_safe_href};

static BULLET_BEFORE_BOLD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*\*[ \t]+\*\*").expect("valid bullet-bold pattern"));

static STAR_BULLET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*\*[ \t]+").expect("valid star bullet pattern"));

static DOUBLED_BOLD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\*\*\s*\*\*([^*]+?)\*\*\s*\*\*").expect("valid doubled bold pattern")
});

static STAR_THEN_BOLD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\* \*\*").expect("valid star-bold pattern"));

static BOLD_SPACE_COLON: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*\s+:").expect("valid bold colon pattern"));

static SECTION_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\*\*([A-Z][^*\n]+?):\*\*\s*").expect("valid section label pattern")
});

static GLYPH_BULLET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[•●○-]\s+\w").expect("valid glyph bullet pattern"));

static BULLET_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[•●○*-]\s+").expect("valid bullet prefix pattern"));

static EXCESS_BLANK_LINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("valid blank line pattern"));

/// Normalise generated markdown before rendering.
///
/// `* item` bullets become `- item`, `**Label:**` becomes a `###` heading,
/// all bullet glyphs become `-`, a blank line separates a list from the
/// paragraph after it, and runs of blank lines collapse to one.
pub fn clean_markdown(text: &str) -> String {
    let text = text.replace("\r\n", "\n");
    let text = BULLET_BEFORE_BOLD.replace_all(&text, "**");
    let text = STAR_BULLET.replace_all(&text, "- ");
    let text = DOUBLED_BOLD.replace_all(&text, "**$1**");
    let text = STAR_THEN_BOLD.replace_all(&text, "**");
    let text = BOLD_SPACE_COLON.replace_all(&text, "**:");
    let text = SECTION_LABEL.replace_all(&text, "\n### $1\n");

    let mut lines = Vec::new();
    let mut in_list = false;
    for line in text.split('\n') {
        let stripped = line.trim();
        let is_bullet = GLYPH_BULLET.is_match(stripped)
            || (stripped.starts_with("* ") && !stripped.starts_with("* **"));
        if is_bullet {
            lines.push(format!("- {}", BULLET_PREFIX.replace(stripped, "")));
            in_list = true;
        } else if !stripped.is_empty() && !stripped.starts_with('#') {
            if in_list {
                lines.push(String::new());
                in_list = false;
            }
            lines.push(line.to_string());
        } else {
            lines.push(line.to_string());
            in_list = false;
        }
    }

    let joined = lines.join("\n");
    EXCESS_BLANK_LINES
        .replace_all(&joined, "\n\n")
        .trim()
        .to_string()
}

/// Render cleaned markdown to HTML.
///
/// Single newlines become `<br />`. Raw HTML is escaped and links with
/// script-capable schemes lose their target.
pub fn render_html(markdown: &str) -> String {
    let options =
        Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS;

    let events = Parser::new_ext(markdown, options).map(|event| match event {
        Event::SoftBreak => Event::HardBreak,
        Event::Html(raw) | Event::InlineHtml(raw) => {
            Event::InlineHtml(CowStr::from(escape_html(&raw)))
        }
        Event::Start(Tag::Link {
            link_type,
            dest_url,
            title,
            id,
        }) if !is_safe_href(&dest_url) => Event::Start(Tag::Link {
            link_type,
            dest_url: CowStr::Borrowed(""),
            title,
            id,
        }),
        other => other,
    });

    let mut html = String::with_capacity(markdown.len() * 3 / 2);
    pulldown_cmark::html::push_html(&mut html, events);
    html
}

/// Clean and render in one step.
pub fn format_answer(text: &str) -> String {
    render_html(&clean_markdown(text))
}

//! Heuristic response formatter
//!
//! Model output arrives as loosely structured plain text. Ordered regex
//! passes reshape it into markdown: line-leading `Label:` sections become
//! headings, stray bullet glyphs become `*`, numbered prefixes are
//! normalized. Heading detection is best-effort and can mis-fire on prose
//! containing colons.

use once_cell::sync::Lazy;
use pulldown_cmark::{html, Event, Options, Parser};
use regex::Regex;

static RE_SECTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^([A-Za-z][A-Za-z ]+):(\s*)").unwrap());
static RE_SUBSECTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^([A-Za-z][A-Za-z ]+):($|[^0-9])").unwrap());
static RE_BULLET: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^[•●○]\s*").unwrap());
static RE_NUMBERED: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^(\d+)\.\s*").unwrap());

/// Reshape raw model text into markdown.
///
/// Idempotent on text that is already clean markdown: converted headings
/// start with `#` and no longer match the label patterns.
pub fn format_markdown(text: &str) -> String {
    let text = text.replace("\r\n", "\n");
    let text = RE_SECTION.replace_all(&text, "## ${1}${2}");
    let text = RE_SUBSECTION.replace_all(&text, "### ${1}${2}");
    let text = RE_BULLET.replace_all(&text, "* ");
    let text = RE_NUMBERED.replace_all(&text, "${1}. ");
    text.trim().to_string()
}

/// Reshape raw model text and render it to HTML.
///
/// Used by the follow-up path. Soft line breaks render as hard breaks,
/// matching the GFM-with-breaks rendering of the search UI.
pub fn format_html(text: &str) -> String {
    let markdown = format_markdown(text);

    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let parser = Parser::new_ext(&markdown, options).map(|event| match event {
        Event::SoftBreak => Event::HardBreak,
        other => other,
    });

    let mut out = String::new();
    html::push_html(&mut out, parser);
    out
}

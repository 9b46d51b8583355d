//! HTML to plain-text cleaning
//!
//! Pure, deterministic transforms with no network access. Parsing is pattern based
//! and never fails on malformed markup.

use regex::Regex;
use std::sync::LazyLock;

static SCRIPT_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>").expect("hardcoded regex pattern is valid")
});
static STYLE_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<style\b[^>]*>.*?</style\s*>").expect("hardcoded regex pattern is valid")
});
static NAV_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<nav\b[^>]*>.*?</nav\s*>").expect("hardcoded regex pattern is valid")
});
static FOOTER_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<footer\b[^>]*>.*?</footer\s*>").expect("hardcoded regex pattern is valid")
});
static ANY_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("hardcoded regex pattern is valid"));
static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("hardcoded regex pattern is valid"));

/// Reduces an HTML document to readable text
///
/// Removes `<script>`, `<style>`, `<nav>` and `<footer>` blocks including their
/// contents, replaces every remaining tag with a space, collapses whitespace runs
/// and trims the result.
///
/// # Example
///
/// ```
/// use sumi_harvest::crawler::clean_html;
///
/// let html = "<nav>Menu</nav><p>Hello <b>world</b></p><script>x()</script>";
/// assert_eq!(clean_html(html), "Hello world");
/// ```
pub fn clean_html(html: &str) -> String {
    let text = SCRIPT_BLOCK.replace_all(html, "");
    let text = STYLE_BLOCK.replace_all(&text, "");
    let text = NAV_BLOCK.replace_all(&text, "");
    let text = FOOTER_BLOCK.replace_all(&text, "");
    let text = ANY_TAG.replace_all(&text, " ");
    WHITESPACE.replace_all(&text, " ").trim().to_string()
}

/// Removes tags without touching scripts or whitespace
///
/// Used to measure how much visible text a raw page carries (SPA shells and
/// block pages carry almost none).
pub fn strip_tags(html: &str) -> String {
    ANY_TAG.replace_all(html, "").trim().to_string()
}

/// Truncates a string to at most `max_chars` characters on a char boundary
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Returns true if `text` contains any of the given markers
pub fn contains_any(text: &str, markers: &[String]) -> bool {
    markers.iter().any(|m| !m.is_empty() && text.contains(m.as_str()))
}

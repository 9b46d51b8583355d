//! HTML and sitemap parsing for link discovery
//!
//! This module handles extracting:
//! - The page title (from the `<title>` tag)
//! - Anchor links, resolved and filtered to the target site
//! - `<loc>` entries from sitemap XML
//!
//! All extraction is lenient: malformed markup or hrefs are skipped, never fatal.

use crate::url::{has_skipped_extension, is_same_site, page_key};
use regex::Regex;
use scraper::{Html, Selector};
use std::sync::LazyLock;
use url::Url;

static SITEMAP_LOC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<loc>\s*(.*?)\s*</loc>").expect("hardcoded regex pattern is valid")
});

/// Extracted information from an HTML page
#[derive(Debug, Clone)]
pub struct ParsedPage {
    /// The page title (from <title> tag)
    pub title: Option<String>,

    /// All anchor links found on the page (absolute HTTP(S) URLs)
    pub links: Vec<Url>,
}

/// Parses HTML content and extracts the title and anchor links
///
/// # Link Extraction Rules
///
/// **Include:** every `<a href="...">`, resolved against `base_url`
///
/// **Exclude:**
/// - `javascript:`, `mailto:`, `tel:` links
/// - Data URIs
/// - Fragment-only links
/// - Anything that does not resolve to an HTTP(S) URL
///
/// # Example
///
/// ```
/// use sumi_harvest::crawler::parse_html;
/// use url::Url;
///
/// let html = r#"<html><head><title>Test</title></head><body><a href="/page">Link</a></body></html>"#;
/// let base_url = Url::parse("https://example.com/").unwrap();
/// let parsed = parse_html(html, &base_url);
/// assert_eq!(parsed.title, Some("Test".to_string()));
/// assert_eq!(parsed.links[0].as_str(), "https://example.com/page");
/// ```
pub fn parse_html(html: &str, base_url: &Url) -> ParsedPage {
    let document = Html::parse_document(html);

    ParsedPage {
        title: extract_title(&document),
        links: extract_links(&document, base_url),
    }
}

/// Extracts only the page title
pub fn parse_title(html: &str) -> Option<String> {
    extract_title(&Html::parse_document(html))
}

/// Extracts the page title from the HTML document
fn extract_title(document: &Html) -> Option<String> {
    let title_selector = Selector::parse("title").ok()?;

    document
        .select(&title_selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Extracts all resolvable anchor links from the HTML document
fn extract_links(document: &Html, base_url: &Url) -> Vec<Url> {
    let mut links = Vec::new();

    if let Ok(a_selector) = Selector::parse("a[href]") {
        for element in document.select(&a_selector) {
            if let Some(href) = element.value().attr("href") {
                if let Some(absolute_url) = resolve_link(href, base_url) {
                    links.push(absolute_url);
                }
            }
        }
    }

    links
}

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - Fragment-only hrefs
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lower = href.to_ascii_lowercase();
    if lower.starts_with("javascript:")
        || lower.starts_with("mailto:")
        || lower.starts_with("tel:")
        || lower.starts_with("data:")
    {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute_url) if matches!(absolute_url.scheme(), "http" | "https") => {
            Some(absolute_url)
        }
        _ => None,
    }
}

/// Discovers same-site content links on a page
///
/// A resolved link is accepted only if its host contains `domain` and its path does
/// not end in one of `skipped_extensions`. Accepted links are returned as crawl keys
/// (origin + path), in document order, possibly with duplicates; the work queue
/// performs deduplication.
pub fn discover_links(
    html: &str,
    source_url: &Url,
    domain: &str,
    skipped_extensions: &[String],
) -> Vec<String> {
    parse_html(html, source_url)
        .links
        .iter()
        .filter(|url| is_same_site(url, domain))
        .filter(|url| !has_skipped_extension(url.path(), skipped_extensions))
        .map(page_key)
        .collect()
}

/// Extracts every `<loc>` value from sitemap XML
///
/// This is a pattern match rather than an XML parse, so truncated or otherwise
/// malformed sitemaps still yield whatever entries are readable.
pub fn extract_sitemap_locs(xml: &str) -> Vec<String> {
    SITEMAP_LOC
        .captures_iter(xml)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim().replace("&amp;", "&"))
        .filter(|loc| !loc.is_empty())
        .collect()
}

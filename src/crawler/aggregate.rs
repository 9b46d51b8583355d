//! Corpus assembly
//!
//! The corpus is a single string: a header line, the home-page section, then one
//! section per scraped page in insertion order. The ceiling is applied last and is
//! the hard backstop against unbounded growth.

use crate::crawler::pages::ScrapedPages;
use std::fmt::Write;

/// Header line introducing the harvested site
pub fn corpus_header(title: &str, target_url: &str) -> String {
    format!("WEBSITE: {} ({})\n\n", title, target_url)
}

/// Builds the corpus and truncates it to `ceiling` characters
pub fn aggregate_corpus(
    title: &str,
    target_url: &str,
    home_content: &str,
    pages: &ScrapedPages,
    ceiling: usize,
) -> String {
    let mut corpus = corpus_header(title, target_url);
    let _ = write!(corpus, "--- HOME PAGE ---\n{}\n\n", home_content);

    for (path, content) in pages.iter() {
        // Every char is at most 4 bytes, so past this point the ceiling is already exceeded.
        if corpus.len() >= ceiling.saturating_mul(4) {
            break;
        }
        let _ = write!(corpus, "--- PAGE: {} ---\n{}\n\n", path, content);
    }

    if let Some((idx, _)) = corpus.char_indices().nth(ceiling) {
        corpus.truncate(idx);
    }
    corpus
}

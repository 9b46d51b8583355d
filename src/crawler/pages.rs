//! Scraped page store
//!
//! Maps a page path to its cleaned text, preserving first-insertion order for
//! corpus assembly. The number of distinct entries is capped.

use std::collections::HashMap;

/// Insertion-ordered, capped mapping from page path to cleaned content
#[derive(Debug, Clone)]
pub struct ScrapedPages {
    entries: Vec<(String, String)>,
    index: HashMap<String, usize>,
    cap: usize,
}

impl ScrapedPages {
    /// Creates an empty store holding at most `cap` entries
    pub fn new(cap: usize) -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
            cap,
        }
    }

    /// Stores content under `path`
    ///
    /// An existing path is overwritten in place. A new path is rejected once the
    /// cap has been reached. Returns true if the content was stored.
    pub fn insert(&mut self, path: impl Into<String>, content: impl Into<String>) -> bool {
        let path = path.into();
        if let Some(&slot) = self.index.get(&path) {
            self.entries[slot].1 = content.into();
            return true;
        }
        if self.is_full() {
            return false;
        }
        self.index.insert(path.clone(), self.entries.len());
        self.entries.push((path, content.into()));
        true
    }

    /// Returns the content stored for `path`
    pub fn get(&self, path: &str) -> Option<&str> {
        self.index
            .get(path)
            .map(|&slot| self.entries[slot].1.as_str())
    }

    /// Iterates `(path, content)` pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(path, content)| (path.as_str(), content.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns true once the cap has been reached
    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.cap
    }

    /// Paths in insertion order
    pub fn paths(&self) -> Vec<String> {
        self.entries.iter().map(|(path, _)| path.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insertion_order_preserved() {
        let mut pages = ScrapedPages::new(10);
        pages.insert("/b", "B");
        pages.insert("/a", "A");
        pages.insert("/c", "C");
        let paths: Vec<&str> = pages.iter().map(|(p, _)| p).collect();
        assert_eq!(paths, vec!["/b", "/a", "/c"]);
    }

    #[test]
    fn test_overwrite_keeps_position() {
        let mut pages = ScrapedPages::new(10);
        pages.insert("/a", "first");
        pages.insert("/b", "B");
        assert!(pages.insert("/a", "second"));
        assert_eq!(pages.len(), 2);
        assert_eq!(pages.get("/a"), Some("second"));
        assert_eq!(pages.paths(), vec!["/a", "/b"]);
    }

    #[test]
    fn test_cap_is_never_exceeded() {
        let mut pages = ScrapedPages::new(3);
        for i in 0..10 {
            pages.insert(format!("/{}", i), "content");
        }
        assert_eq!(pages.len(), 3);
        assert!(pages.is_full());
        assert!(pages.insert("/0", "updated"));
        assert_eq!(pages.len(), 3);
    }
}

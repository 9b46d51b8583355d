//! Visited set and work queue for a single harvest
//!
//! The frontier is owned by one harvest and discarded with it. URLs are crawl keys
//! (origin + path). A URL is never enqueued while visited or already queued, and
//! it is marked visited the moment it is handed out for fetching.

use std::collections::{HashSet, VecDeque};

/// Frontier of a bounded breadth-first harvest
#[derive(Debug, Default)]
pub struct Frontier {
    /// URLs already fetched or handed out for fetching
    visited: HashSet<String>,

    /// FIFO of URLs awaiting fetch
    queue: VecDeque<String>,

    /// Mirror of `queue` for O(1) membership checks
    queued: HashSet<String>,
}

impl Frontier {
    /// Creates a frontier with the target already marked visited
    pub fn new(target_key: impl Into<String>) -> Self {
        let mut frontier = Self::default();
        frontier.visited.insert(target_key.into());
        frontier
    }

    /// Appends a URL unless it is already visited or queued
    ///
    /// Returns true if the URL was added.
    pub fn enqueue(&mut self, url: impl Into<String>) -> bool {
        let url = url.into();
        if self.visited.contains(&url) || self.queued.contains(&url) {
            return false;
        }
        self.queued.insert(url.clone());
        self.queue.push_back(url);
        true
    }

    /// Appends many URLs, returning how many were new
    pub fn enqueue_all<I, S>(&mut self, urls: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut added = 0;
        for url in urls {
            if self.enqueue(url) {
                added += 1;
            }
        }
        added
    }

    /// Pops up to `size` URLs from the front of the queue
    ///
    /// Entries that were visited in the meantime are consumed but skipped; every
    /// returned URL is marked visited before this call returns, so two fetches of
    /// the same URL can never be in flight at once.
    pub fn next_batch(&mut self, size: usize) -> Vec<String> {
        let mut batch = Vec::with_capacity(size);
        for _ in 0..size {
            let Some(url) = self.queue.pop_front() else {
                break;
            };
            self.queued.remove(&url);
            if self.visited.insert(url.clone()) {
                batch.push(url);
            }
        }
        batch
    }

    /// Returns true if the URL has been fetched or handed out
    pub fn is_visited(&self, url: &str) -> bool {
        self.visited.contains(url)
    }

    /// Number of URLs waiting in the queue
    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// Returns true when nothing is waiting to be fetched
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

//! Breadth-first frontier and the visited set it guards.

use std::collections::{HashSet, VecDeque};

/// A discovered URL waiting to be visited
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierEntry {
    /// Canonical URL
    pub url: String,

    /// Link distance from the seed
    pub depth: u32,
}

/// Canonical URLs already claimed for fetching. Only grows.
#[derive(Debug, Default)]
pub struct VisitedSet(HashSet<String>);

impl VisitedSet {
    /// Mark `url` visited. Returns false when it already was, in which case
    /// the caller must not fetch it.
    pub fn claim(&mut self, url: &str) -> bool {
        if self.0.contains(url) {
            return false;
        }
        self.0.insert(url.to_string())
    }

    /// Whether `url` has been claimed
    pub fn contains(&self, url: &str) -> bool {
        self.0.contains(url)
    }

    /// Number of claimed URLs
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when nothing has been claimed yet
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// FIFO of (url, depth) pairs.
///
/// A URL may sit in the queue several times; membership in the visited set is
/// decided when an entry is popped, so each canonical URL is handed out at
/// most once. Entries deeper than `max_depth` are discarded on pop.
#[derive(Debug)]
pub struct Frontier {
    queue: VecDeque<FrontierEntry>,
    visited: VisitedSet,
    max_depth: u32,
}

impl Frontier {
    /// Create an empty frontier bounded by `max_depth`
    pub fn new(max_depth: u32) -> Self {
        Self {
            queue: VecDeque::new(),
            visited: VisitedSet::default(),
            max_depth,
        }
    }

    /// Queue a URL. URLs already visited are not queued again.
    pub fn push(&mut self, url: String, depth: u32) {
        if self.visited.contains(&url) {
            return;
        }
        self.queue.push_back(FrontierEntry { url, depth });
    }

    /// Queue the links found on a page visited at `parent_depth`
    pub fn push_links<I>(&mut self, links: I, parent_depth: u32) -> usize
    where
        I: IntoIterator<Item = String>,
    {
        let before = self.queue.len();
        for link in links {
            self.push(link, parent_depth + 1);
        }
        self.queue.len() - before
    }

    /// Pop the next entry that is within depth and not yet visited, claiming it.
    pub fn next_entry(&mut self) -> Option<FrontierEntry> {
        while let Some(entry) = self.queue.pop_front() {
            if entry.depth > self.max_depth {
                continue;
            }
            if self.visited.claim(&entry.url) {
                return Some(entry);
            }
        }
        None
    }

    /// Entries still queued (including ones that will be skipped)
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// The visited set
    pub fn visited(&self) -> &VisitedSet {
        &self.visited
    }
}

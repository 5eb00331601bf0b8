//! Result container for merging and deduplicating backend output

use super::types::SearchResult;
use std::collections::HashSet;

/// Ordered, size-bounded accumulator of results from several backends.
///
/// Results must be fed in merge order (registry order, then each backend's
/// own order). The first result seen for a URL wins; later duplicates are
/// dropped. Nothing is added once `limit` results are held.
#[derive(Debug, Clone)]
pub struct ResultContainer {
    results: Vec<SearchResult>,
    seen: HashSet<String>,
    limit: usize,
}

impl ResultContainer {
    /// Create a container holding at most `limit` results
    pub fn new(limit: usize) -> Self {
        Self {
            results: Vec::with_capacity(limit.min(64)),
            seen: HashSet::new(),
            limit,
        }
    }

    /// Add a result; returns `false` when it was a duplicate or the container is full
    pub fn add_result(&mut self, result: SearchResult) -> bool {
        if self.is_full() || self.seen.contains(&result.url) {
            return false;
        }
        self.seen.insert(result.url.clone());
        self.results.push(result);
        true
    }

    /// Add one backend's results in their returned order
    pub fn extend_results(&mut self, results: Vec<SearchResult>) {
        for result in results {
            if self.is_full() {
                break;
            }
            self.add_result(result);
        }
    }

    /// Whether the container reached its limit
    pub fn is_full(&self) -> bool {
        self.results.len() >= self.limit
    }

    pub fn result_count(&self) -> usize {
        self.results.len()
    }

    /// Consume the container, yielding results in first-seen order
    pub fn into_results(self) -> Vec<SearchResult> {
        self.results
    }
}

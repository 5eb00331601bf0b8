//! Search execution: validation, cursor handling and aggregation

use super::aggregator::Aggregator;
use super::cursor::{decode_cursor, encode_cursor};
use super::models::SearchRequest;
use crate::backends::RequestParams;
use crate::error::SearchError;
use crate::results::ResultPage;
use std::sync::Arc;

/// Search executor turning a [`SearchRequest`] into a [`ResultPage`]
#[derive(Clone)]
pub struct Search {
    aggregator: Arc<Aggregator>,
    default_limit: usize,
    max_limit: usize,
}

impl Search {
    /// Create a new search executor
    pub fn new(aggregator: Arc<Aggregator>) -> Self {
        Self {
            aggregator,
            default_limit: 10,
            max_limit: 100,
        }
    }

    pub fn with_default_limit(mut self, limit: usize) -> Self {
        self.default_limit = limit;
        self
    }

    /// Clamp every page to at most `limit` results
    pub fn with_max_limit(mut self, limit: usize) -> Self {
        self.max_limit = limit.max(1);
        self
    }

    pub fn aggregator(&self) -> &Aggregator {
        &self.aggregator
    }

    /// Execute one page request.
    ///
    /// Rejects an empty query or a zero limit before any backend is called.
    /// Larger limits are clamped to the configured maximum.
    /// The next cursor always points `limit` past the current start, even on
    /// a short page.
    pub async fn execute(&self, request: SearchRequest) -> Result<ResultPage, SearchError> {
        if request.is_empty() {
            return Err(SearchError::InvalidRequest("query must not be empty".to_string()));
        }
        let limit = request.limit.unwrap_or(self.default_limit);
        if limit == 0 {
            return Err(SearchError::InvalidRequest("limit must be at least 1".to_string()));
        }
        let limit = limit.min(self.max_limit);

        let params = RequestParams::new(request.query.clone())
            .with_limit(limit)
            .with_kind(request.kind)
            .with_offset(decode_cursor(request.cursor.as_deref()));
        let start = params.offset;

        let results = self.aggregator.aggregate(&params).await;
        let next_cursor = encode_cursor(start.saturating_add(limit as u64));

        Ok(ResultPage::new(request.query, results, Some(next_cursor)))
    }
}

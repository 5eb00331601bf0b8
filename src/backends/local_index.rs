//! Backend reading pages previously stored in the durable index

use super::traits::*;
use crate::error::BackendError;
use crate::index::IndexStore;
use crate::results::SearchResult;
use async_trait::async_trait;
use tracing::warn;

pub const NAME: &str = "local_index";

/// Full-text search over ingested pages
pub struct LocalIndex {
    store: IndexStore,
}

impl LocalIndex {
    pub fn new(store: IndexStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Backend for LocalIndex {
    fn name(&self) -> &str {
        NAME
    }

    async fn search(&self, params: &RequestParams) -> Result<Vec<SearchResult>, BackendError> {
        if params.query.trim().is_empty() {
            return Ok(vec![]);
        }

        // An index that cannot answer right now simply has nothing to add.
        let docs = match self
            .store
            .search(&params.query, params.zero_based_offset(), params.limit)
            .await
        {
            Ok(docs) => docs,
            Err(e) => {
                warn!(error = %e, "local index query failed");
                return Ok(vec![]);
            }
        };

        Ok(docs
            .into_iter()
            .filter_map(|doc| {
                let title = if doc.title.is_empty() {
                    params.query.clone()
                } else {
                    doc.title
                };
                SearchResult::new(title, doc.url, NAME)
                    .ok()
                    .map(|r| r.with_snippet(doc.snippet))
            })
            .collect())
    }
}

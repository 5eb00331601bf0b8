//! Ingestion into the durable index
//!
//! Pages reach the index either as bare links supplied by an operator or as
//! results pulled from the Serper provider.

use crate::backends::serper::Serper;
use crate::backends::RequestParams;
use crate::error::SearchError;
use crate::index::{IndexStore, IndexedDocument};
use crate::network::HttpClient;
use crate::results::SearchResult;
use tracing::{info, warn};

/// Source label of results stored from operator-supplied links
pub const MANUAL_SOURCE: &str = "manual";

pub struct Ingestor {
    store: Option<IndexStore>,
    serper: Serper,
    serper_key: Option<String>,
}

impl Ingestor {
    pub fn new(client: HttpClient, store: Option<IndexStore>, serper_key: Option<String>) -> Self {
        Self {
            store,
            serper: Serper::new(client, serper_key.clone().unwrap_or_default()),
            serper_key,
        }
    }

    /// Sets a custom Serper endpoint (useful for testing)
    pub fn with_serper_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.serper = self.serper.with_base_url(base_url);
        self
    }

    pub fn store(&self) -> Option<&IndexStore> {
        self.store.as_ref()
    }

    /// Store newline-separated links as minimal documents and echo them back.
    ///
    /// Lines that are not absolute URLs are skipped. Without an index the
    /// links are only echoed.
    pub async fn store_links(&self, links: &str) -> Result<Vec<SearchResult>, SearchError> {
        let mut stored = Vec::new();

        for line in links.lines().map(str::trim).filter(|l| !l.is_empty()) {
            let Ok(result) = SearchResult::new(line, line, MANUAL_SOURCE) else {
                warn!("Skipping invalid link: {}", line);
                continue;
            };
            if let Some(store) = &self.store {
                store.index_document(&IndexedDocument::from_url(line)).await?;
            }
            stored.push(result);
        }

        info!("Stored {} manual links", stored.len());
        Ok(stored)
    }

    /// Pull results for `query` from Serper and store them in the index.
    ///
    /// `key` replaces the configured key for this call only.
    pub async fn fetch_from_serper(
        &self,
        query: &str,
        limit: usize,
        key: Option<&str>,
    ) -> Result<Vec<SearchResult>, SearchError> {
        let key = key
            .filter(|k| !k.trim().is_empty())
            .or(self.serper_key.as_deref())
            .ok_or_else(|| SearchError::Unavailable("SERPER_API_KEY not configured".to_string()))?;

        let params = RequestParams::new(query).with_limit(limit);
        let results = self.serper.search_with_key(&params, key).await?;

        if let Some(store) = &self.store {
            if !results.is_empty() {
                let docs: Vec<_> = results.iter().map(IndexedDocument::from_result).collect();
                store.bulk_index(&docs).await?;
                info!("Stored {} serper results for '{}'", docs.len(), query);
            }
        }

        Ok(results)
    }
}

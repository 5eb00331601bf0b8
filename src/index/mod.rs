//! Durable index collaborator
//!
//! A thin OpenSearch REST client. The `local_index` backend reads from it and
//! the ingestion surface writes to it; no core logic lives here.

use crate::error::IndexError;
use crate::network::{BackendRequest, BackendResponse, HttpClient};
use crate::results::SearchResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// A page stored in the durable index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexedDocument {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub snippet: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stored_at: Option<DateTime<Utc>>,
}

impl IndexedDocument {
    /// Minimal document for a bare URL
    pub fn from_url(url: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            title: url.clone(),
            url,
            snippet: String::new(),
            body: None,
            stored_at: Some(Utc::now()),
        }
    }

    pub fn from_result(result: &SearchResult) -> Self {
        Self {
            title: result.title.clone(),
            url: result.url.clone(),
            snippet: result.snippet.clone().unwrap_or_default(),
            body: None,
            stored_at: Some(Utc::now()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchHits {
    #[serde(default)]
    hits: HitList,
}

#[derive(Debug, Default, Deserialize)]
struct HitList {
    #[serde(default)]
    hits: Vec<Hit>,
}

#[derive(Debug, Deserialize)]
struct Hit {
    #[serde(rename = "_source")]
    source: Option<IndexedDocument>,
}

#[derive(Debug, Default, Deserialize)]
struct BulkResponse {
    #[serde(default)]
    errors: bool,
    #[serde(default)]
    items: Vec<HashMap<String, BulkItem>>,
}

#[derive(Debug, Deserialize)]
struct BulkItem {
    #[serde(default)]
    error: Option<serde_json::Value>,
}

/// OpenSearch-backed page store
#[derive(Debug, Clone)]
pub struct IndexStore {
    client: HttpClient,
    base_url: String,
    index: String,
}

impl IndexStore {
    pub fn new(client: HttpClient, url: &str, index: impl Into<String>) -> Result<Self, IndexError> {
        Url::parse(url)?;
        Ok(Self {
            client,
            base_url: url.trim_end_matches('/').to_string(),
            index: index.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.base_url
    }

    pub fn index_name(&self) -> &str {
        &self.index
    }

    /// Whether the cluster answers within `timeout`
    pub async fn ping(&self, timeout: Duration) -> bool {
        match self
            .client
            .execute_with_timeout(BackendRequest::get(&self.base_url), timeout)
            .await
        {
            Ok(response) => response.is_success(),
            Err(e) => {
                debug!(error = %e, "index ping failed");
                false
            }
        }
    }

    /// Create the pages index when it does not exist yet
    pub async fn ensure_index(&self) -> Result<(), IndexError> {
        let index_url = format!("{}/{}", self.base_url, self.index);
        let head = self.client.execute(BackendRequest::head(&index_url)).await?;
        if head.is_success() {
            return Ok(());
        }

        let response = self.client.execute(BackendRequest::put(&index_url)).await?;
        check(response)?;
        info!(index = %self.index, "created index");
        Ok(())
    }

    /// Store one document, keyed by its URL
    pub async fn index_document(&self, doc: &IndexedDocument) -> Result<(), IndexError> {
        let url = format!(
            "{}/{}/_doc/{}",
            self.base_url,
            self.index,
            urlencoding::encode(&doc.url)
        );
        let request = BackendRequest::put(url)
            .param("refresh", "true")
            .json(serde_json::to_value(doc)?);
        check(self.client.execute(request).await?)?;
        Ok(())
    }

    /// Store many documents in one `_bulk` call
    pub async fn bulk_index(&self, docs: &[IndexedDocument]) -> Result<(), IndexError> {
        if docs.is_empty() {
            return Ok(());
        }

        let mut body = String::new();
        for doc in docs {
            let action = serde_json::json!({ "index": { "_index": self.index, "_id": doc.url } });
            body.push_str(&action.to_string());
            body.push('\n');
            body.push_str(&serde_json::to_string(doc)?);
            body.push('\n');
        }

        let request = BackendRequest::post(format!("{}/_bulk", self.base_url))
            .param("refresh", "true")
            .raw("application/x-ndjson", body.into_bytes());
        let response = check(self.client.execute(request).await?)?;

        // _bulk answers 200 even when individual documents are rejected.
        let outcome: BulkResponse = response.json()?;
        if outcome.errors {
            let failed = outcome
                .items
                .iter()
                .flat_map(|item| item.values())
                .filter(|item| item.error.is_some())
                .count();
            return Err(IndexError::Status {
                status: response.status,
                message: format!("{failed} of {} documents were rejected", docs.len()),
            });
        }
        debug!(count = docs.len(), "bulk indexed documents");
        Ok(())
    }

    /// Full-text search over title, snippet and body
    pub async fn search(
        &self,
        query: &str,
        from: u64,
        size: usize,
    ) -> Result<Vec<IndexedDocument>, IndexError> {
        let body = serde_json::json!({
            "query": {
                "multi_match": {
                    "query": query,
                    "fields": ["title^2", "snippet", "body"],
                }
            },
            "from": from,
            "size": size,
        });
        let request = BackendRequest::post(format!("{}/{}/_search", self.base_url, self.index)).json(body);
        let response = check(self.client.execute(request).await?)?;
        let hits: SearchHits = response.json()?;

        Ok(hits.hits.hits.into_iter().filter_map(|h| h.source).collect())
    }
}

fn check(response: BackendResponse) -> Result<BackendResponse, IndexError> {
    if response.is_success() {
        Ok(response)
    } else {
        Err(IndexError::Status {
            status: response.status,
            message: response.text.chars().take(200).collect(),
        })
    }
}

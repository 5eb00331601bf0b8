//! Backend for the remote Compass index
//!
//! The index answers `GET /search?q=&type=` with either a bare list or an
//! object holding `results`. Stored pages may carry their fields inside a
//! JSON-encoded `value` string, decoded here as a [`StoredRecord`].

use super::traits::*;
use crate::error::BackendError;
use crate::network::{BackendRequest, HttpClient};
use crate::results::SearchResult;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::time::Duration;
use tracing::debug;

pub const NAME: &str = "compass_ai";

/// A page as persisted by the Compass index
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct StoredRecord {
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub snippet: String,
    #[serde(default)]
    pub thumb: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SearchBody {
    List(Vec<Value>),
    Wrapped {
        #[serde(default)]
        results: Vec<Value>,
    },
}

impl SearchBody {
    fn into_items(self) -> Vec<Value> {
        match self {
            Self::List(items) | Self::Wrapped { results: items } => items,
        }
    }
}

pub struct CompassAi {
    client: HttpClient,
    base_url: String,
}

impl CompassAi {
    pub fn new(client: HttpClient, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    async fn fetch(&self, query: &str, kind: Option<SearchKind>) -> Result<Vec<Value>, BackendError> {
        let mut request = BackendRequest::get(format!("{}/search", self.base_url)).param("q", query);
        if let Some(kind) = kind {
            request = request.param("type", kind);
        }

        let body: SearchBody = self.client.execute(request).await?.error_for_status()?.json()?;
        Ok(body.into_items())
    }

    fn convert(item: &Value, kind: SearchKind) -> Option<SearchResult> {
        let fields = expand_stored_record(item)?;
        let get = |key: &str| fields.get(key).and_then(Value::as_str).map(str::to_string);

        let (title, url, snippet, thumbnail, display_link) = match kind {
            SearchKind::Videos => (get("title"), get("url"), get("description"), get("thumb"), get("displayUrl")),
            SearchKind::News => (get("title"), get("url"), get("snippet"), None, get("source")),
            SearchKind::Maps => (
                get("title").or_else(|| get("formattedAddress")),
                get("osmUrl"),
                get("formattedAddress"),
                get("thumbnail"),
                None,
            ),
            SearchKind::Images | SearchKind::Reviews | SearchKind::Shopping => {
                (get("title"), get("url"), get("snippet"), get("thumb"), get("displayUrl"))
            }
            SearchKind::Web => (get("title"), get("url"), get("snippet"), None, get("displayUrl")),
        };

        SearchResult::new(title.unwrap_or_default(), url?, NAME).ok().map(|r| {
            r.with_snippet(snippet.unwrap_or_default())
                .with_thumbnail(thumbnail)
                .with_display_link(display_link)
        })
    }
}

/// Replace an item carrying a JSON `value` string with the decoded record.
///
/// Items whose `value` does not decode are used as they are.
fn expand_stored_record(item: &Value) -> Option<Map<String, Value>> {
    let object = item.as_object()?;
    let record = object
        .get("value")
        .and_then(Value::as_str)
        .and_then(|raw| serde_json::from_str::<StoredRecord>(raw).ok());

    match record {
        Some(record) => {
            let mut fields = Map::new();
            fields.insert("url".into(), Value::String(record.url));
            fields.insert("title".into(), Value::String(record.title));
            fields.insert("snippet".into(), Value::String(record.snippet));
            if let Some(thumb) = record.thumb {
                fields.insert("thumb".into(), Value::String(thumb));
            }
            Some(fields)
        }
        None => Some(object.clone()),
    }
}

#[async_trait]
impl Backend for CompassAi {
    fn name(&self) -> &str {
        NAME
    }

    fn timeout(&self) -> Option<Duration> {
        Some(Duration::from_secs(30))
    }

    async fn search(&self, params: &RequestParams) -> Result<Vec<SearchResult>, BackendError> {
        if params.limit == 0 {
            return Ok(vec![]);
        }

        let typed = (params.kind != SearchKind::Web).then_some(params.kind);
        let mut items = self.fetch(&params.query, typed).await?;

        // The index does not always label verticals; fall back to an untyped query.
        if items.is_empty() && typed.is_some() {
            debug!(kind = %params.kind, "compass_ai retrying without type filter");
            items = self.fetch(&params.query, None).await?;
        }

        let mut seen = HashSet::new();
        let results: Vec<SearchResult> = items
            .iter()
            .filter_map(|item| Self::convert(item, params.kind))
            .filter(|r| seen.insert(r.url.clone()))
            .take(params.limit)
            .collect();

        Ok(results)
    }
}

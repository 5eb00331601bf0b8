//! Result type definitions

use serde::{Deserialize, Serialize};
use url::Url;

/// A single normalized search hit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// The title of the result
    pub title: String,
    /// Absolute URL of the result, also the deduplication key
    pub url: String,
    /// Content snippet/description
    pub snippet: Option<String>,
    /// Backend that returned this result
    pub source: String,
    /// Thumbnail URL
    #[serde(alias = "thumb")]
    pub thumbnail: Option<String>,
    /// Human-readable site label
    pub display_link: Option<String>,
}

impl SearchResult {
    /// Create a new result, rejecting URLs that are not absolute
    pub fn new(
        title: impl Into<String>,
        url: impl Into<String>,
        source: impl Into<String>,
    ) -> Result<Self, url::ParseError> {
        let url = url.into();
        Url::parse(&url)?;

        Ok(Self {
            title: title.into(),
            url,
            snippet: None,
            source: source.into(),
            thumbnail: None,
            display_link: None,
        })
    }

    /// Add a snippet; empty text is treated as absent
    pub fn with_snippet(mut self, snippet: impl Into<String>) -> Self {
        let snippet = snippet.into();
        self.snippet = (!snippet.is_empty()).then_some(snippet);
        self
    }

    /// Add a thumbnail, silently dropping anything that is not an absolute URL
    pub fn with_thumbnail(mut self, thumbnail: Option<impl Into<String>>) -> Self {
        self.thumbnail = thumbnail
            .map(Into::into)
            .filter(|t| Url::parse(t).is_ok());
        self
    }

    /// Add a display link; empty text is treated as absent
    pub fn with_display_link(mut self, display_link: Option<impl Into<String>>) -> Self {
        self.display_link = display_link.map(Into::into).filter(|d| !d.is_empty());
        self
    }
}

/// One page of aggregated results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultPage {
    /// The query as sent by the caller
    pub query: String,
    /// Merged results in first-seen order
    pub results: Vec<SearchResult>,
    /// Token for the following page
    pub next_cursor: Option<String>,
}

impl ResultPage {
    pub fn new(query: impl Into<String>, results: Vec<SearchResult>, next_cursor: Option<String>) -> Self {
        Self {
            query: query.into(),
            results,
            next_cursor,
        }
    }
}

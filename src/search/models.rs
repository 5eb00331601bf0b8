//! Search request model

use crate::backends::SearchKind;
use serde::{Deserialize, Serialize};

/// A page request as it arrives from a caller
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchRequest {
    /// The search query string
    #[serde(default, alias = "q")]
    pub query: String,
    /// Page size; the configured default when absent
    #[serde(default)]
    pub limit: Option<usize>,
    /// Content vertical
    #[serde(default, rename = "type", alias = "kind")]
    pub kind: SearchKind,
    /// Opaque cursor from a previous page
    #[serde(default)]
    pub cursor: Option<String>,
}

impl SearchRequest {
    /// Create a first-page request with defaults
    pub fn simple(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_kind(mut self, kind: SearchKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_cursor(mut self, cursor: impl Into<String>) -> Self {
        self.cursor = Some(cursor.into());
        self
    }

    /// Check if query is empty
    pub fn is_empty(&self) -> bool {
        self.query.trim().is_empty()
    }
}

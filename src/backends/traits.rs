//! Backend traits and types

use crate::error::BackendError;
use crate::results::SearchResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Content vertical requested by the caller.
///
/// The set is open: anything unrecognized parses as [`SearchKind::Web`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum SearchKind {
    #[default]
    Web,
    Images,
    Videos,
    News,
    Maps,
    Reviews,
    Shopping,
}

impl SearchKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Web => "web",
            Self::Images => "images",
            Self::Videos => "videos",
            Self::News => "news",
            Self::Maps => "maps",
            Self::Reviews => "reviews",
            Self::Shopping => "shopping",
        }
    }
}

impl From<&str> for SearchKind {
    fn from(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "images" | "image" => Self::Images,
            "videos" | "video" => Self::Videos,
            "news" => Self::News,
            "maps" | "map" => Self::Maps,
            "reviews" => Self::Reviews,
            "shopping" => Self::Shopping,
            _ => Self::Web,
        }
    }
}

impl From<String> for SearchKind {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl fmt::Display for SearchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameters of one backend search call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestParams {
    /// Search query string
    pub query: String,
    /// Maximum number of results wanted
    pub limit: usize,
    /// Content vertical
    pub kind: SearchKind,
    /// 1-based index of the first result wanted
    pub offset: u64,
}

impl RequestParams {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            limit: 10,
            kind: SearchKind::Web,
            offset: 1,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_kind(mut self, kind: SearchKind) -> Self {
        self.kind = kind;
        self
    }

    /// Set the start offset, clamped to 1
    pub fn with_offset(mut self, offset: u64) -> Self {
        self.offset = offset.max(1);
        self
    }

    /// Zero-based offset for providers that count from 0
    pub fn zero_based_offset(&self) -> u64 {
        self.offset.saturating_sub(1)
    }
}

/// The capability every search backend implements.
///
/// A backend must return an empty vector, not an error, when a query simply
/// has no matches. Errors mean configuration or transport failure; the
/// aggregator logs them and treats the backend as absent for that request.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Unique backend name, also used as the `source` of its results
    fn name(&self) -> &str;

    /// Time budget for one `search` call
    fn timeout(&self) -> Option<Duration> {
        None
    }

    /// Run one search
    async fn search(&self, params: &RequestParams) -> Result<Vec<SearchResult>, BackendError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_kind_degrades_to_web() {
        assert_eq!(SearchKind::from("podcasts"), SearchKind::Web);
        assert_eq!(SearchKind::from(""), SearchKind::Web);
        assert_eq!(SearchKind::from("Images"), SearchKind::Images);
    }

    #[test]
    fn kind_deserializes_leniently() {
        let kind: SearchKind = serde_json::from_str("\"shopping\"").unwrap();
        assert_eq!(kind, SearchKind::Shopping);
        let kind: SearchKind = serde_json::from_str("\"holograms\"").unwrap();
        assert_eq!(kind, SearchKind::Web);
    }

    #[test]
    fn offset_clamped_to_one() {
        let params = RequestParams::new("rust").with_offset(0);
        assert_eq!(params.offset, 1);
        assert_eq!(params.zero_based_offset(), 0);

        let params = params.with_offset(21);
        assert_eq!(params.zero_based_offset(), 20);
    }
}

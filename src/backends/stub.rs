//! Placeholder backends returning deterministic results
//!
//! They stand in for providers that have no real integration yet and are
//! handy for exercising the aggregation path end to end.

use super::traits::*;
use crate::error::BackendError;
use crate::results::SearchResult;
use async_trait::async_trait;

pub struct StubBackend {
    name: &'static str,
    label: &'static str,
}

impl StubBackend {
    pub fn new(name: &'static str, label: &'static str) -> Self {
        Self { name, label }
    }

    pub fn bing() -> Self {
        Self::new("bing_stub", "Bing")
    }

    pub fn brave() -> Self {
        Self::new("brave_stub", "Brave")
    }
}

#[async_trait]
impl Backend for StubBackend {
    fn name(&self) -> &str {
        self.name
    }

    async fn search(&self, params: &RequestParams) -> Result<Vec<SearchResult>, BackendError> {
        let encoded = urlencoding::encode(&params.query);
        let slug = self.label.to_ascii_lowercase();

        let end = params.offset.saturating_add(params.limit as u64);
        let results = (params.offset..end)
            .filter_map(|i| {
                SearchResult::new(
                    format!("{} Stub Result {} for '{}'", self.label, i, params.query),
                    format!("https://example.com/{slug}/{i}?q={encoded}"),
                    self.name,
                )
                .ok()
                .map(|r| {
                    r.with_snippet(format!(
                        "This is a placeholder snippet from {} for '{}'.",
                        self.label, params.query
                    ))
                })
            })
            .collect();

        Ok(results)
    }
}

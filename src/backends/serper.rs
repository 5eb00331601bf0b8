//! Serper.dev Google search backend

use super::traits::*;
use crate::error::BackendError;
use crate::network::{BackendRequest, HttpClient};
use crate::results::SearchResult;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

pub const NAME: &str = "serper";

const DEFAULT_BASE_URL: &str = "https://google.serper.dev/search";
const MAX_NUM: usize = 10;

#[derive(Debug, Deserialize)]
struct SerperApiResponse {
    #[serde(default)]
    organic: Vec<SerperOrganicItem>,
}

#[derive(Debug, Deserialize)]
struct SerperOrganicItem {
    #[serde(default)]
    title: String,
    link: String,
    snippet: Option<String>,
}

pub struct Serper {
    client: HttpClient,
    api_key: String,
    base_url: String,
}

impl Serper {
    pub fn new(client: HttpClient, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Sets a custom base URL for the API (useful for testing)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Search with an explicit key instead of the configured one
    pub async fn search_with_key(
        &self,
        params: &RequestParams,
        api_key: &str,
    ) -> Result<Vec<SearchResult>, BackendError> {
        let num = params.limit.min(MAX_NUM);
        if num == 0 {
            return Ok(vec![]);
        }

        let request = BackendRequest::post(&self.base_url)
            .header("X-API-KEY", api_key)
            .json(serde_json::json!({ "q": params.query, "num": num }));

        let body: SerperApiResponse = self.client.execute(request).await?.error_for_status()?.json()?;
        debug!(count = body.organic.len(), "serper answered");

        Ok(body
            .organic
            .into_iter()
            .filter_map(|item| {
                SearchResult::new(item.title, item.link, NAME)
                    .ok()
                    .map(|r| r.with_snippet(item.snippet.unwrap_or_default()))
            })
            .take(params.limit)
            .collect())
    }
}

#[async_trait]
impl Backend for Serper {
    fn name(&self) -> &str {
        NAME
    }

    async fn search(&self, params: &RequestParams) -> Result<Vec<SearchResult>, BackendError> {
        self.search_with_key(params, &self.api_key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn serper(server: &MockServer) -> Serper {
        Serper::new(HttpClient::new().unwrap(), "configured").with_base_url(server.uri())
    }

    #[tokio::test]
    async fn test_organic_results() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("X-API-KEY", "configured"))
            .and(body_json(serde_json::json!({ "q": "axum", "num": 10 })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "organic": [
                    { "title": "axum", "link": "https://docs.rs/axum", "snippet": "web framework", "position": 1 },
                    { "title": "bad", "link": "not a url", "position": 2 }
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let results = serper(&server)
            .search(&RequestParams::new("axum").with_limit(25))
            .await
            .unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].source, NAME);
        assert_eq!(results[0].snippet.as_deref(), Some("web framework"));
    }

    #[tokio::test]
    async fn test_key_override() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("X-API-KEY", "override"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let results = serper(&server)
            .search_with_key(&RequestParams::new("axum"), "override")
            .await
            .unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_rate_limited() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let err = serper(&server).search(&RequestParams::new("axum")).await.unwrap_err();
        assert!(matches!(err, BackendError::RateLimited));
    }
}

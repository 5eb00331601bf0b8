//! Google Custom Search backend with credential rotation
//!
//! Keys and search engine ids come in parallel lists. A key answered with
//! HTTP 429 is retired for the rest of the process and the call moves on to
//! the next one, at most once per configured key.

use super::rotator::{Credential, CredentialRotator};
use super::traits::*;
use crate::cache::{query_cache_key, ResponseCache};
use crate::config::GoogleCseSettings;
use crate::error::BackendError;
use crate::network::{BackendRequest, HttpClient};
use crate::results::SearchResult;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

pub const NAME: &str = "google_cse";

const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/customsearch/v1";
/// The API refuses more than 10 results per call
const MAX_NUM: usize = 10;

#[derive(Debug, Deserialize)]
struct CseResponse {
    #[serde(default)]
    items: Vec<CseItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CseItem {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    snippet: Option<String>,
    display_link: Option<String>,
    image: Option<CseImage>,
    pagemap: Option<CsePagemap>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CseImage {
    context_link: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CsePagemap {
    #[serde(default)]
    cse_thumbnail: Vec<CseThumbnail>,
}

#[derive(Debug, Deserialize)]
struct CseThumbnail {
    src: Option<String>,
}

/// Google Custom Search JSON API backend
pub struct GoogleCse {
    client: HttpClient,
    rotator: CredentialRotator,
    base_url: String,
    cache: Option<ResponseCache>,
}

impl GoogleCse {
    pub fn new(client: HttpClient, rotator: CredentialRotator) -> Self {
        Self {
            client,
            rotator,
            base_url: DEFAULT_BASE_URL.to_string(),
            cache: None,
        }
    }

    /// Build from settings, failing when no key is configured
    pub fn from_settings(client: HttpClient, settings: &GoogleCseSettings) -> Result<Self, BackendError> {
        if settings.api_keys.is_empty() {
            return Err(BackendError::Unavailable(
                "GOOGLE_API_KEYS not set or empty".to_string(),
            ));
        }
        if settings.cx_ids.is_empty() && settings.default_cx.is_none() {
            return Err(BackendError::Unavailable(
                "neither GOOGLE_CSE_CXS nor GOOGLE_CSE_CX is set".to_string(),
            ));
        }

        let rotator = CredentialRotator::from_lists(
            NAME,
            &settings.api_keys,
            &settings.cx_ids,
            settings.default_cx.as_deref(),
        );
        let mut backend = Self::new(client, rotator);
        if let Some(ttl) = settings.cache_ttl {
            backend = backend.with_cache(ResponseCache::new(ttl, 1000));
        }
        Ok(backend)
    }

    /// Sets a custom base URL for the API (useful for testing)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_cache(mut self, cache: ResponseCache) -> Self {
        self.cache = Some(cache);
        self
    }

    fn build_request(&self, params: &RequestParams, credential: &Credential, num: usize) -> BackendRequest {
        let query = match params.kind {
            SearchKind::Videos => format!("{} site:youtube.com", params.query),
            _ => params.query.clone(),
        };

        let mut request = BackendRequest::get(&self.base_url)
            .param("key", &credential.key)
            .param("cx", &credential.aux_id)
            .param("q", query)
            .param("num", num)
            .param("start", params.offset);

        if params.kind == SearchKind::Images {
            request = request.param("searchType", "image");
        }
        request
    }

    fn parse_items(items: Vec<CseItem>, kind: SearchKind) -> Vec<SearchResult> {
        items
            .into_iter()
            .filter_map(|item| {
                let (link, thumbnail) = if kind == SearchKind::Images {
                    let page = item
                        .image
                        .and_then(|i| i.context_link)
                        .unwrap_or_else(|| item.link.clone());
                    (page, Some(item.link))
                } else {
                    let thumb = item
                        .pagemap
                        .and_then(|p| p.cse_thumbnail.into_iter().next())
                        .and_then(|t| t.src);
                    (item.link, thumb)
                };

                SearchResult::new(item.title, link, NAME).ok().map(|r| {
                    r.with_snippet(item.snippet.unwrap_or_default())
                        .with_thumbnail(thumbnail.map(force_https))
                        .with_display_link(item.display_link)
                })
            })
            .collect()
    }
}

fn force_https(url: String) -> String {
    match url.strip_prefix("http:") {
        Some(rest) => format!("https:{rest}"),
        None => url,
    }
}

#[async_trait]
impl Backend for GoogleCse {
    fn name(&self) -> &str {
        NAME
    }

    async fn search(&self, params: &RequestParams) -> Result<Vec<SearchResult>, BackendError> {
        let num = params.limit.min(MAX_NUM);
        if num == 0 {
            return Ok(vec![]);
        }

        let cache_key = query_cache_key(NAME, params, num);
        if let Some(cache) = &self.cache {
            if let Some(hit) = cache.get(&cache_key).await {
                debug!(query = %params.query, "google_cse cache hit");
                return Ok(hit.as_ref().clone());
            }
        }

        let max_attempts = self.rotator.len().await;
        let mut attempts = 0;

        while attempts < max_attempts {
            let credential = self.rotator.next().await?;
            let response = self
                .client
                .execute(self.build_request(params, &credential, num))
                .await?;

            if response.is_rate_limited() {
                self.rotator.mark_exhausted(credential.index).await;
                attempts += 1;
                continue;
            }

            let body: CseResponse = response.error_for_status()?.json()?;
            let results = Self::parse_items(body.items, params.kind);
            debug!(count = results.len(), attempts = attempts + 1, "google_cse answered");

            if let Some(cache) = &self.cache {
                cache.set(cache_key, results.clone()).await;
            }
            return Ok(results);
        }

        Err(BackendError::CredentialsExhausted(format!(
            "no usable Google CSE keys left after {attempts} attempts"
        )))
    }
}

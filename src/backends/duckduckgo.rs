//! DuckDuckGo backend
//!
//! Web results come from the public Instant Answer API. Images, videos and
//! news come from the JSON endpoints behind the site, which need a `vqd`
//! token scraped from the search page first.

use super::traits::*;
use crate::error::BackendError;
use crate::network::{BackendRequest, HttpClient};
use crate::results::SearchResult;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

pub const NAME: &str = "duckduckgo";

const API_URL: &str = "https://api.duckduckgo.com/";
const SITE_URL: &str = "https://duckduckgo.com";
const MAX_TITLE_CHARS: usize = 120;

static VQD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"vqd=["']?([\d-]+)["']?"#).expect("vqd pattern is valid"));

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct InstantAnswer {
    results: Vec<Topic>,
    abstract_text: String,
    #[serde(rename = "AbstractURL")]
    abstract_url: String,
    heading: String,
    related_topics: Vec<Topic>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct Topic {
    text: Option<String>,
    #[serde(rename = "FirstURL")]
    first_url: Option<String>,
    topics: Vec<Topic>,
}

#[derive(Debug, Default, Deserialize)]
struct MediaResponse {
    #[serde(default)]
    results: Vec<Value>,
}

pub struct DuckDuckGo {
    client: HttpClient,
    api_url: String,
    site_url: String,
}

impl DuckDuckGo {
    pub fn new(client: HttpClient) -> Self {
        Self {
            client,
            api_url: API_URL.to_string(),
            site_url: SITE_URL.to_string(),
        }
    }

    /// Point both endpoints at another host (useful for testing)
    pub fn with_base_urls(mut self, api_url: impl Into<String>, site_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self.site_url = site_url.into();
        self
    }

    async fn web(&self, params: &RequestParams) -> Result<Vec<SearchResult>, BackendError> {
        let request = BackendRequest::get(&self.api_url)
            .param("q", &params.query)
            .param("format", "json")
            .param("no_redirect", "1")
            .param("no_html", "1");
        let answer: InstantAnswer = self.client.execute(request).await?.error_for_status()?.json()?;

        Ok(self.parse_instant_answer(answer, params))
    }

    fn parse_instant_answer(&self, answer: InstantAnswer, params: &RequestParams) -> Vec<SearchResult> {
        let limit = params.limit;
        let mut results = Vec::new();

        for topic in &answer.results {
            let (Some(text), Some(url)) = (&topic.text, &topic.first_url) else {
                continue;
            };
            if is_internal(url) {
                continue;
            }
            let title = truncate_chars(text, MAX_TITLE_CHARS);
            let title = if title.is_empty() { params.query.clone() } else { title };
            if let Ok(r) = SearchResult::new(title, url, NAME) {
                results.push(r.with_snippet(text.as_str()));
            }
            if results.len() >= limit {
                return results;
            }
        }

        if !answer.abstract_text.is_empty()
            && !answer.abstract_url.is_empty()
            && !is_internal(&answer.abstract_url)
        {
            let title = if answer.heading.is_empty() {
                params.query.clone()
            } else {
                answer.heading.clone()
            };
            if let Ok(r) = SearchResult::new(title, &answer.abstract_url, NAME) {
                results.push(r.with_snippet(answer.abstract_text.as_str()));
            }
        }

        let mut related = Vec::new();
        walk_topics(&answer.related_topics, &mut related);
        for topic in related {
            if results.len() >= limit {
                break;
            }
            let (Some(text), Some(url)) = (&topic.text, &topic.first_url) else {
                continue;
            };
            let head = text.split(" - ").next().unwrap_or(text);
            if let Ok(r) = SearchResult::new(truncate_chars(head, MAX_TITLE_CHARS), url, NAME) {
                results.push(r.with_snippet(text.as_str()));
            }
        }

        if results.is_empty() {
            results.extend(self.fallback(params, "View more results on DuckDuckGo"));
        }
        results.truncate(limit);
        results
    }

    async fn media(&self, params: &RequestParams) -> Result<Vec<SearchResult>, BackendError> {
        let endpoint = match params.kind {
            SearchKind::Images => "i.js",
            SearchKind::Videos => "v.js",
            SearchKind::News => "news.js",
            _ => return Ok(vec![]),
        };

        let page = self
            .client
            .execute(BackendRequest::get(&self.site_url).param("q", &params.query))
            .await?
            .error_for_status()?;
        let vqd = VQD_RE
            .captures(&page.text)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
            .ok_or_else(|| BackendError::InvalidResponse("vqd token not found".to_string()))?;

        let request = BackendRequest::get(format!("{}/{}", self.site_url, endpoint))
            .param("l", "us-en")
            .param("o", "json")
            .param("q", &params.query)
            .param("vqd", vqd)
            .param("s", params.zero_based_offset());
        let body: MediaResponse = self.client.execute(request).await?.error_for_status()?.json()?;

        Ok(Self::media_to_results(&body.results, params))
    }

    fn media_to_results(items: &[Value], params: &RequestParams) -> Vec<SearchResult> {
        let str_field = |item: &Value, key: &str| item.get(key).and_then(Value::as_str).map(str::to_string);

        items
            .iter()
            .filter_map(|item| {
                let title = str_field(item, "title").unwrap_or_else(|| params.query.clone());
                let (url, thumbnail, snippet) = match params.kind {
                    SearchKind::Images => (
                        str_field(item, "url").or_else(|| str_field(item, "image")),
                        str_field(item, "thumbnail").or_else(|| str_field(item, "image")),
                        None,
                    ),
                    SearchKind::Videos => (
                        str_field(item, "content").or_else(|| str_field(item, "url")),
                        item.get("images")
                            .and_then(|i| i.get("medium").or_else(|| i.get("small")))
                            .and_then(Value::as_str)
                            .map(str::to_string),
                        str_field(item, "description"),
                    ),
                    _ => (
                        str_field(item, "url"),
                        str_field(item, "image"),
                        str_field(item, "excerpt").or_else(|| str_field(item, "body")),
                    ),
                };

                let url = url.filter(|u| u.starts_with("http"))?;
                SearchResult::new(title, url, NAME).ok().map(|r| {
                    r.with_snippet(snippet.unwrap_or_default())
                        .with_thumbnail(thumbnail)
                })
            })
            .take(params.limit)
            .collect()
    }

    fn fallback(&self, params: &RequestParams, snippet: &str) -> Option<SearchResult> {
        let url = format!("{}/?q={}", SITE_URL, urlencoding::encode(&params.query));
        SearchResult::new(params.query.clone(), url, NAME)
            .ok()
            .map(|r| r.with_snippet(snippet))
    }
}

fn is_internal(url: &str) -> bool {
    url.contains("duckduckgo.com")
}

fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

fn walk_topics<'a>(topics: &'a [Topic], out: &mut Vec<&'a Topic>) {
    for topic in topics {
        match (&topic.text, &topic.first_url) {
            (Some(_), Some(url)) => {
                if !is_internal(url) {
                    out.push(topic);
                }
            }
            _ => walk_topics(&topic.topics, out),
        }
    }
}

#[async_trait]
impl Backend for DuckDuckGo {
    fn name(&self) -> &str {
        NAME
    }

    async fn search(&self, params: &RequestParams) -> Result<Vec<SearchResult>, BackendError> {
        if params.limit == 0 {
            return Ok(vec![]);
        }
        if params.kind == SearchKind::Web {
            return self.web(params).await;
        }

        let mut results = self.media(params).await?;
        if results.is_empty() {
            let snippet = format!("View more {} results on DuckDuckGo", params.kind);
            results.extend(self.fallback(params, &snippet));
        }
        results.truncate(params.limit);
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend() -> DuckDuckGo {
        DuckDuckGo::new(HttpClient::new().unwrap())
    }

    fn answer(json: Value) -> InstantAnswer {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_results_then_abstract_then_topics() {
        let answer = answer(serde_json::json!({
            "Results": [
                { "Text": "Official site", "FirstURL": "https://www.rust-lang.org/" },
                { "Text": "Internal", "FirstURL": "https://duckduckgo.com/Rust" }
            ],
            "Heading": "Rust",
            "AbstractText": "Rust is a language.",
            "AbstractURL": "https://en.wikipedia.org/wiki/Rust",
            "RelatedTopics": [
                { "Name": "Group", "Topics": [
                    { "Text": "Cargo - the package manager", "FirstURL": "https://doc.rust-lang.org/cargo/" }
                ]}
            ]
        }));
        let results = backend().parse_instant_answer(answer, &RequestParams::new("rust"));

        let urls: Vec<_> = results.iter().map(|r| r.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://www.rust-lang.org/",
                "https://en.wikipedia.org/wiki/Rust",
                "https://doc.rust-lang.org/cargo/"
            ]
        );
        assert_eq!(results[2].title, "Cargo");
    }

    #[test]
    fn test_empty_answer_falls_back_to_site_link() {
        let results = backend().parse_instant_answer(InstantAnswer::default(), &RequestParams::new("no hits"));

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].url, "https://duckduckgo.com/?q=no%20hits");
    }

    #[test]
    fn test_limit_respected() {
        let topics: Vec<Value> = (0..5)
            .map(|i| serde_json::json!({ "Text": format!("t{i}"), "FirstURL": format!("https://e{i}.com/") }))
            .collect();
        let answer = answer(serde_json::json!({ "Results": topics }));
        let results = backend().parse_instant_answer(answer, &RequestParams::new("q").with_limit(2));
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn test_video_items() {
        let items = vec![
            serde_json::json!({
                "title": "Rust in 100 seconds",
                "content": "https://www.youtube.com/watch?v=5C_HPTJg5ek",
                "description": "Quick intro",
                "images": { "medium": "https://i.ytimg.com/vi/x/mq.jpg" }
            }),
            serde_json::json!({ "title": "no link" }),
        ];
        let params = RequestParams::new("rust").with_kind(SearchKind::Videos);
        let results = DuckDuckGo::media_to_results(&items, &params);

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].snippet.as_deref(), Some("Quick intro"));
        assert_eq!(results[0].thumbnail.as_deref(), Some("https://i.ytimg.com/vi/x/mq.jpg"));
    }

    #[test]
    fn test_vqd_pattern() {
        let html = r#"<script>vqd="4-1234567890-98765";</script>"#;
        let vqd = VQD_RE.captures(html).and_then(|c| c.get(1)).map(|m| m.as_str());
        assert_eq!(vqd, Some("4-1234567890-98765"));
    }
}

//! HTTP request handlers

use super::state::AppState;
use crate::backends::BackendLoader;
use crate::error::SearchError;
use crate::results::{ResultPage, SearchResult};
use crate::search::SearchRequest;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

/// Search handler
pub async fn search(
    State(state): State<AppState>,
    Query(request): Query<SearchRequest>,
) -> Result<Json<ResultPage>, SearchError> {
    let page = state.search.execute(request).await?;
    Ok(Json(page))
}

/// Query parameters for ingestion
#[derive(Debug, Default, Deserialize)]
pub struct FetchParams {
    pub q: Option<String>,
    pub limit: Option<usize>,
    /// `serper` pulls from the provider; anything else aggregates
    pub source: Option<String>,
    /// Provider key overriding the configured one for this call
    pub key: Option<String>,
    /// Newline-separated URLs to store
    pub links: Option<String>,
}

/// Ingestion handler
pub async fn fetch(
    State(state): State<AppState>,
    Query(params): Query<FetchParams>,
) -> Result<Json<Vec<SearchResult>>, SearchError> {
    if let Some(links) = params.links.as_deref().filter(|l| !l.trim().is_empty()) {
        return Ok(Json(state.ingestor.store_links(links).await?));
    }

    let query = params
        .q
        .filter(|q| !q.trim().is_empty())
        .ok_or_else(|| SearchError::InvalidRequest("query or links required".to_string()))?;
    let limit = params.limit.unwrap_or(state.settings.search.default_limit);

    match params.source.as_deref() {
        Some("serper") | Some("serpapi") => {
            let results = state
                .ingestor
                .fetch_from_serper(&query, limit, params.key.as_deref())
                .await?;
            Ok(Json(results))
        }
        _ => {
            let page = state
                .search
                .execute(SearchRequest::simple(query).with_limit(limit))
                .await?;
            Ok(Json(page.results))
        }
    }
}

/// Diagnostics handler
pub async fn debug(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "index_url_set": state.settings.index.url.is_some(),
        "index_client": state.ingestor.store().is_some(),
        "loaded_backends": state.loaded_backends(),
        "configured_backends": state.settings.search.backends,
        "available_backends": BackendLoader::available_backends(),
        "metrics": state.metrics.snapshot(),
    }))
}

/// Health check handler
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": crate::VERSION
    }))
}

/// Favicon handler
pub async fn favicon() -> impl IntoResponse {
    StatusCode::NO_CONTENT
}

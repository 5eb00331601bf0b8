//! Turso (libSQL) backend
//!
//! Queries a `search_index(title, url, snippet)` table through the libSQL
//! HTTP pipeline API.

use super::traits::*;
use crate::config::TursoSettings;
use crate::error::BackendError;
use crate::network::{BackendRequest, HttpClient};
use crate::results::SearchResult;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

pub const NAME: &str = "turso";

const SEARCH_SQL: &str = "SELECT title, url, snippet FROM search_index WHERE title LIKE ? LIMIT ? OFFSET ?";

#[derive(Debug, Deserialize)]
struct PipelineResponse {
    #[serde(default)]
    results: Vec<PipelineResult>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum PipelineResult {
    Ok { response: StatementResponse },
    Error { error: PipelineError },
}

#[derive(Debug, Deserialize)]
struct StatementResponse {
    result: Option<StatementResult>,
}

#[derive(Debug, Deserialize)]
struct StatementResult {
    #[serde(default)]
    rows: Vec<Vec<Cell>>,
}

#[derive(Debug, Deserialize)]
struct Cell {
    value: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct PipelineError {
    message: String,
}

impl Cell {
    fn text(&self) -> Option<String> {
        match self.value.as_ref()? {
            Value::String(s) => Some(s.clone()),
            Value::Null => None,
            other => Some(other.to_string()),
        }
    }
}

pub struct Turso {
    client: HttpClient,
    url: String,
    auth_token: String,
}

impl Turso {
    pub fn new(client: HttpClient, url: &str, auth_token: impl Into<String>) -> Self {
        // libsql:// addresses are served over HTTPS
        let url = match url.strip_prefix("libsql://") {
            Some(host) => format!("https://{host}"),
            None => url.to_string(),
        };
        Self {
            client,
            url: url.trim_end_matches('/').to_string(),
            auth_token: auth_token.into(),
        }
    }

    pub fn from_settings(client: HttpClient, settings: &TursoSettings) -> Result<Self, BackendError> {
        match (&settings.url, &settings.auth_token) {
            (Some(url), Some(token)) => Ok(Self::new(client, url, token.as_str())),
            _ => Err(BackendError::Unavailable(
                "Turso credentials not configured (TURSO_DB_URL / TURSO_AUTH_TOKEN)".to_string(),
            )),
        }
    }

    fn pipeline_body(params: &RequestParams) -> Value {
        json!({
            "requests": [
                {
                    "type": "execute",
                    "stmt": {
                        "sql": SEARCH_SQL,
                        "args": [
                            { "type": "text", "value": format!("%{}%", params.query) },
                            { "type": "integer", "value": params.limit.to_string() },
                            { "type": "integer", "value": params.zero_based_offset().to_string() }
                        ]
                    }
                },
                { "type": "close" }
            ]
        })
    }
}

#[async_trait]
impl Backend for Turso {
    fn name(&self) -> &str {
        NAME
    }

    async fn search(&self, params: &RequestParams) -> Result<Vec<SearchResult>, BackendError> {
        if params.limit == 0 {
            return Ok(vec![]);
        }

        let request = BackendRequest::post(format!("{}/v2/pipeline", self.url))
            .header("Authorization", format!("Bearer {}", self.auth_token))
            .json(Self::pipeline_body(params));
        let body: PipelineResponse = self.client.execute(request).await?.error_for_status()?.json()?;

        let rows = match body.results.into_iter().next() {
            Some(PipelineResult::Ok { response }) => response.result.map(|r| r.rows).unwrap_or_default(),
            Some(PipelineResult::Error { error }) => {
                return Err(BackendError::InvalidResponse(error.message));
            }
            None => vec![],
        };

        Ok(rows
            .iter()
            .filter_map(|row| {
                let title = row.first().and_then(Cell::text).unwrap_or_default();
                let url = row.get(1).and_then(Cell::text)?;
                let snippet = row.get(2).and_then(Cell::text).unwrap_or_default();
                SearchResult::new(title, url, NAME).ok().map(|r| r.with_snippet(snippet))
            })
            .collect())
    }
}

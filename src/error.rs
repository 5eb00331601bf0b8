//! Error types shared across the aggregation engine

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::time::Duration;
use thiserror::Error;

/// Errors raised by a single backend, either while it is being constructed
/// or while it serves a `search` call.
///
/// None of these ever reach a `/search` caller: the loader drops backends
/// that fail to build and the aggregator treats a failed call as an empty
/// contribution. Only direct provider calls made for ingestion surface them.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Missing configuration or an unreachable dependency at construction.
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    /// Every credential of a rotation-capable backend is exhausted or unusable.
    #[error("credentials exhausted: {0}")]
    CredentialsExhausted(String),

    /// The upstream provider answered with a rate-limit signal.
    #[error("rate limited by upstream provider")]
    RateLimited,

    /// The call did not finish within its time budget.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Non-success HTTP status from the provider.
    #[error("HTTP error: {status} - {message}")]
    Http { status: u16, message: String },

    /// The provider answered but the body could not be understood.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl BackendError {
    /// Short label used for diagnostics counters
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Unavailable(_) => "unavailable",
            Self::CredentialsExhausted(_) => "credentials_exhausted",
            Self::RateLimited => "rate_limited",
            Self::Timeout(_) => "timeout",
            Self::Network(_) => "network",
            Self::Http { .. } => "http",
            Self::InvalidResponse(_) => "invalid_response",
        }
    }
}

impl From<serde_json::Error> for BackendError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidResponse(format!("JSON parse error: {err}"))
    }
}

/// Errors surfaced to callers of the search surface.
#[derive(Debug, Error)]
pub enum SearchError {
    /// The request was rejected before any fan-out happened.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// A collaborator needed for this request is not configured.
    #[error("{0}")]
    Unavailable(String),

    /// An upstream provider failed while serving an ingestion request.
    #[error("upstream provider failed: {0}")]
    Upstream(#[from] BackendError),

    #[error("index error: {0}")]
    Index(#[from] IndexError),
}

impl IntoResponse for SearchError {
    fn into_response(self) -> Response {
        let status = match self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Upstream(_) | Self::Index(_) => StatusCode::BAD_GATEWAY,
        };
        let body = Json(serde_json::json!({ "detail": self.to_string() }));
        (status, body).into_response()
    }
}

/// Errors from the durable index collaborator.
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("index request failed: {0}")]
    Transport(#[from] BackendError),

    #[error("index returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("failed to encode document: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("invalid index URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

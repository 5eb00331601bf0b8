//! Outgoing request and response types shared by HTTP-backed backends

use crate::error::BackendError;
use std::collections::HashMap;

/// HTTP request to be made by a backend
#[derive(Debug, Clone)]
pub struct BackendRequest {
    /// URL to request
    pub url: String,
    /// HTTP method
    pub method: HttpMethod,
    /// Request headers
    pub headers: Vec<(String, String)>,
    /// Query parameters, sent in insertion order
    pub params: Vec<(String, String)>,
    /// Request body
    pub body: Option<RequestBody>,
}

impl BackendRequest {
    /// Create a GET request
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(url, HttpMethod::Get)
    }

    /// Create a HEAD request
    pub fn head(url: impl Into<String>) -> Self {
        Self::new(url, HttpMethod::Head)
    }

    /// Create a POST request
    pub fn post(url: impl Into<String>) -> Self {
        Self::new(url, HttpMethod::Post)
    }

    /// Create a PUT request
    pub fn put(url: impl Into<String>) -> Self {
        Self::new(url, HttpMethod::Put)
    }

    fn new(url: impl Into<String>, method: HttpMethod) -> Self {
        Self {
            url: url.into(),
            method,
            headers: Vec::new(),
            params: Vec::new(),
            body: None,
        }
    }

    /// Add a header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }

    /// Add a query parameter
    pub fn param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.params.push((key.into(), value.to_string()));
        self
    }

    /// Add JSON body
    pub fn json(mut self, data: serde_json::Value) -> Self {
        self.body = Some(RequestBody::Json(data));
        self
    }

    /// Add a raw body with its content type
    pub fn raw(mut self, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.body = Some(RequestBody::Raw {
            content_type: content_type.into(),
            bytes,
        });
        self
    }
}

/// HTTP method
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Head,
    Post,
    Put,
}

/// Request body types
#[derive(Debug, Clone)]
pub enum RequestBody {
    Json(serde_json::Value),
    Raw { content_type: String, bytes: Vec<u8> },
}

/// HTTP response returned to a backend
#[derive(Debug)]
pub struct BackendResponse {
    /// HTTP status code
    pub status: u16,
    /// Response headers
    pub headers: HashMap<String, String>,
    /// Response body as text
    pub text: String,
}

impl BackendResponse {
    /// Parse response as JSON
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, BackendError> {
        Ok(serde_json::from_str(&self.text)?)
    }

    /// Check if response is successful (2xx)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Check if response indicates rate limiting
    pub fn is_rate_limited(&self) -> bool {
        self.status == 429
    }

    /// Turn a non-success response into a typed error
    pub fn error_for_status(self) -> Result<Self, BackendError> {
        if self.is_rate_limited() {
            return Err(BackendError::RateLimited);
        }
        if !self.is_success() {
            let message = self.text.chars().take(200).collect();
            return Err(BackendError::Http {
                status: self.status,
                message,
            });
        }
        Ok(self)
    }
}

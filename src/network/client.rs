//! HTTP client for making requests to search providers

use super::request::{BackendRequest, BackendResponse, HttpMethod, RequestBody};
use crate::config::OutgoingSettings;
use crate::error::BackendError;
use reqwest::{Client, Response};
use std::collections::HashMap;
use std::time::Duration;

/// HTTP client wrapper shared by every HTTP-backed backend
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    default_timeout: Duration,
}

impl HttpClient {
    /// Create a new HTTP client with default settings
    pub fn new() -> Result<Self, BackendError> {
        Self::with_settings(&OutgoingSettings::default())
    }

    /// Create a new HTTP client with custom settings
    pub fn with_settings(settings: &OutgoingSettings) -> Result<Self, BackendError> {
        let mut builder = Client::builder()
            .timeout(Duration::from_secs_f64(settings.request_timeout))
            .pool_max_idle_per_host(settings.pool_maxsize)
            .user_agent(&settings.user_agent)
            .gzip(true)
            .brotli(true);

        // SSL verification
        if !settings.verify_ssl {
            builder = builder.danger_accept_invalid_certs(true);
        }

        // Proxy settings
        if let Some(ref proxy_url) = settings.proxies.all {
            builder = builder.proxy(reqwest::Proxy::all(proxy_url)?);
        } else {
            if let Some(ref http) = settings.proxies.http {
                builder = builder.proxy(reqwest::Proxy::http(http)?);
            }
            if let Some(ref https) = settings.proxies.https {
                builder = builder.proxy(reqwest::Proxy::https(https)?);
            }
        }

        Ok(Self {
            client: builder.build()?,
            default_timeout: Duration::from_secs_f64(settings.request_timeout),
        })
    }

    /// Execute a backend request
    pub async fn execute(&self, request: BackendRequest) -> Result<BackendResponse, BackendError> {
        self.execute_with_timeout(request, self.default_timeout).await
    }

    /// Execute a backend request with custom timeout
    pub async fn execute_with_timeout(
        &self,
        request: BackendRequest,
        timeout: Duration,
    ) -> Result<BackendResponse, BackendError> {
        let mut req_builder = match request.method {
            HttpMethod::Get => self.client.get(&request.url),
            HttpMethod::Head => self.client.head(&request.url),
            HttpMethod::Post => self.client.post(&request.url),
            HttpMethod::Put => self.client.put(&request.url),
        };

        req_builder = req_builder.timeout(timeout);

        for (key, value) in &request.headers {
            req_builder = req_builder.header(key, value);
        }

        if !request.params.is_empty() {
            req_builder = req_builder.query(&request.params);
        }

        if let Some(body) = request.body {
            req_builder = match body {
                RequestBody::Json(json) => req_builder.json(&json),
                RequestBody::Raw {
                    content_type,
                    bytes,
                } => req_builder
                    .header(reqwest::header::CONTENT_TYPE, content_type)
                    .body(bytes),
            };
        }

        let response = req_builder.send().await.map_err(|e| {
            if e.is_timeout() {
                BackendError::Timeout(timeout)
            } else {
                BackendError::Network(e)
            }
        })?;

        Self::parse_response(response).await
    }

    async fn parse_response(response: Response) -> Result<BackendResponse, BackendError> {
        let status = response.status().as_u16();

        let mut headers = HashMap::new();
        for (key, value) in response.headers() {
            if let Ok(v) = value.to_str() {
                headers.insert(key.to_string(), v.to_string());
            }
        }

        let text = response.text().await?;

        Ok(BackendResponse {
            status,
            headers,
            text,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_client_creation() {
        let client = HttpClient::new();
        assert!(client.is_ok());
    }

    #[tokio::test]
    async fn test_execute_sends_params_and_headers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("q", "rust lang"))
            .and(header("X-API-KEY", "k"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{\"ok\":true}"))
            .expect(1)
            .mount(&server)
            .await;

        let client = HttpClient::new().unwrap();
        let request = BackendRequest::get(format!("{}/search", server.uri()))
            .param("q", "rust lang")
            .header("X-API-KEY", "k");
        let response = client.execute(request).await.unwrap();

        assert!(response.is_success());
        let body: serde_json::Value = response.json().unwrap();
        assert_eq!(body["ok"], true);
    }

    #[tokio::test]
    async fn test_timeout_is_typed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
            .mount(&server)
            .await;

        let client = HttpClient::new().unwrap();
        let err = client
            .execute_with_timeout(BackendRequest::get(server.uri()), Duration::from_millis(50))
            .await
            .unwrap_err();

        assert!(matches!(err, BackendError::Timeout(_)));
    }
}

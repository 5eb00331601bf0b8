//! HTTP surface tests driven through the axum router

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use compass_search::backends::BackendLoader;
use compass_search::ingest::Ingestor;
use compass_search::network::HttpClient;
use compass_search::search::decode_cursor;
use compass_search::web::{create_router, AppState};
use compass_search::Settings;
use serde_json::Value;
use tower::ServiceExt;
use wiremock::matchers::{header, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn state() -> AppState {
    let mut settings = Settings::default();
    settings.search.backends = vec!["bing_stub".into(), "brave_stub".into(), "google_cse".into()];

    let client = HttpClient::new().unwrap();
    let registry = BackendLoader::load(&settings, &client, None).await;
    AppState::new(settings, registry, client, None)
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

#[tokio::test]
async fn search_returns_merged_page() {
    let app = create_router(state().await);
    let (status, body) = get(app, "/search?q=rust&limit=4").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["query"], "rust");

    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 4);
    // Registry order: every bing result precedes brave.
    assert!(results.iter().all(|r| r["source"] == "bing_stub"));

    let cursor = body["next_cursor"].as_str().unwrap();
    assert_eq!(decode_cursor(Some(cursor)), 5);
}

#[tokio::test]
async fn search_follows_cursor() {
    let app = create_router(state().await);
    let (_, first) = get(app.clone(), "/search?q=rust&limit=2").await;
    let cursor = first["next_cursor"].as_str().unwrap().to_string();

    let (status, second) = get(app, &format!("/search?q=rust&limit=2&cursor={cursor}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["results"][0]["url"], "https://example.com/bing/3?q=rust");
}

#[tokio::test]
async fn search_rejects_empty_query() {
    let app = create_router(state().await);
    let (status, body) = get(app.clone(), "/search?q=").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().unwrap().contains("empty"));

    let (status, _) = get(app, "/search?q=rust&limit=0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_type_searches_web() {
    let app = create_router(state().await);
    let (status, body) = get(app, "/search?q=rust&type=holograms&limit=1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["results"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn fetch_echoes_links() {
    let app = create_router(state().await);
    let (status, body) = get(app, "/fetch?q=x&links=https%3A%2F%2Fa.com%2F%0Ahttps%3A%2F%2Fb.com%2F").await;

    assert_eq!(status, StatusCode::OK);
    let results = body.as_array().unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["source"], "manual");
    assert_eq!(results[1]["title"], "https://b.com/");
}

#[tokio::test]
async fn fetch_defaults_to_aggregation() {
    let app = create_router(state().await);
    let (status, body) = get(app, "/fetch?q=rust&limit=3").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn fetch_from_serper_with_key_override() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(header("X-API-KEY", "override"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "organic": [{ "title": "Tokio", "link": "https://tokio.rs/", "snippet": "runtime" }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let ingestor = Ingestor::new(HttpClient::new().unwrap(), None, None).with_serper_base_url(server.uri());
    let app = create_router(state().await.with_ingestor(ingestor));

    let (status, body) = get(app.clone(), "/fetch?q=tokio&source=serper&key=override").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["url"], "https://tokio.rs/");

    // Without an override or a configured key the provider is unavailable.
    let (status, _) = get(app, "/fetch?q=tokio&source=serper").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn debug_reports_backends_and_metrics() {
    let app = create_router(state().await);
    let _ = get(app.clone(), "/search?q=rust").await;
    let (status, body) = get(app, "/debug").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["index_url_set"], false);
    assert_eq!(body["index_client"], false);
    assert_eq!(body["loaded_backends"], serde_json::json!(["bing_stub", "brave_stub"]));
    assert_eq!(
        body["configured_backends"],
        serde_json::json!(["bing_stub", "brave_stub", "google_cse"])
    );
    assert_eq!(body["metrics"]["backends"]["bing_stub"]["successes"], 1);
}

#[tokio::test]
async fn health_and_favicon() {
    let app = create_router(state().await);
    let (status, body) = get(app.clone(), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    for path in ["/favicon.ico", "/favicon.png"] {
        let (status, _) = get(app.clone(), path).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }
}

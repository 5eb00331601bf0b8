//! Backend loader for building the registry from configuration

use super::compass_ai::CompassAi;
use super::duckduckgo::DuckDuckGo;
use super::google_cse::GoogleCse;
use super::local_index::{self, LocalIndex};
use super::registry::{BackendDescriptor, BackendRegistry};
use super::serper::Serper;
use super::stub::StubBackend;
use super::traits::Backend;
use super::turso::Turso;
use crate::config::Settings;
use crate::error::BackendError;
use crate::index::IndexStore;
use crate::network::HttpClient;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Everything a backend constructor may draw on
pub struct BackendContext<'a> {
    pub settings: &'a Settings,
    pub client: HttpClient,
    /// Entry for this backend in the per-backend credential map
    pub credential: Option<String>,
    pub index: Option<IndexStore>,
}

type Constructor = fn(&BackendContext<'_>) -> Result<Arc<dyn Backend>, BackendError>;

static REGISTRATIONS: Lazy<HashMap<&'static str, Constructor>> = Lazy::new(|| {
    let mut table: HashMap<&'static str, Constructor> = HashMap::new();
    table.insert(local_index::NAME, build_local_index);
    table.insert(super::duckduckgo::NAME, build_duckduckgo);
    table.insert(super::google_cse::NAME, build_google_cse);
    table.insert(super::serper::NAME, build_serper);
    table.insert(super::compass_ai::NAME, build_compass_ai);
    table.insert(super::turso::NAME, build_turso);
    table.insert("bing_stub", build_bing_stub);
    table.insert("brave_stub", build_brave_stub);
    table
});

fn build_local_index(ctx: &BackendContext<'_>) -> Result<Arc<dyn Backend>, BackendError> {
    let store = ctx
        .index
        .clone()
        .ok_or_else(|| BackendError::Unavailable("OPENSEARCH_URL not configured".to_string()))?;
    Ok(Arc::new(LocalIndex::new(store)))
}

fn build_duckduckgo(ctx: &BackendContext<'_>) -> Result<Arc<dyn Backend>, BackendError> {
    Ok(Arc::new(DuckDuckGo::new(ctx.client.clone())))
}

fn build_google_cse(ctx: &BackendContext<'_>) -> Result<Arc<dyn Backend>, BackendError> {
    let mut settings = ctx.settings.google_cse.clone();
    if settings.api_keys.is_empty() {
        settings.api_keys.extend(ctx.credential.clone());
    }
    Ok(Arc::new(GoogleCse::from_settings(ctx.client.clone(), &settings)?))
}

fn build_serper(ctx: &BackendContext<'_>) -> Result<Arc<dyn Backend>, BackendError> {
    let key = ctx
        .credential
        .clone()
        .or_else(|| ctx.settings.serper.api_key.clone())
        .ok_or_else(|| BackendError::Unavailable("SERPER_API_KEY not configured".to_string()))?;
    Ok(Arc::new(Serper::new(ctx.client.clone(), key)))
}

fn build_compass_ai(ctx: &BackendContext<'_>) -> Result<Arc<dyn Backend>, BackendError> {
    Ok(Arc::new(CompassAi::new(
        ctx.client.clone(),
        ctx.settings.compass_ai.base_url.as_str(),
    )))
}

fn build_turso(ctx: &BackendContext<'_>) -> Result<Arc<dyn Backend>, BackendError> {
    Ok(Arc::new(Turso::from_settings(ctx.client.clone(), &ctx.settings.turso)?))
}

fn build_bing_stub(_: &BackendContext<'_>) -> Result<Arc<dyn Backend>, BackendError> {
    Ok(Arc::new(StubBackend::bing()))
}

fn build_brave_stub(_: &BackendContext<'_>) -> Result<Arc<dyn Backend>, BackendError> {
    Ok(Arc::new(StubBackend::brave()))
}

/// Loader for building the backend registry from configuration
pub struct BackendLoader;

impl BackendLoader {
    /// Build every configured backend, in configured order.
    ///
    /// Unknown names and failed constructors are logged and skipped. When an
    /// index is given and answers a ping, `local_index` goes first.
    pub async fn load(settings: &Settings, client: &HttpClient, index: Option<&IndexStore>) -> BackendRegistry {
        let mut registry = BackendRegistry::new();

        for name in &settings.search.backends {
            let credential = settings.api_key(name).map(str::to_string);
            let ctx = BackendContext {
                settings,
                client: client.clone(),
                credential: credential.clone(),
                index: index.cloned(),
            };

            match Self::create_backend(name, &ctx) {
                Ok(backend) => {
                    info!("Loaded backend: {}", name);
                    if !registry.register(BackendDescriptor::new(backend, credential)) {
                        warn!("Backend {} listed twice, keeping the first", name);
                    }
                }
                Err(e) => warn!("Skipping backend {}: {}", name, e),
            }
        }

        if let Some(store) = index {
            if !registry.contains(local_index::NAME) {
                let timeout = Duration::from_secs_f64(settings.index.ping_timeout);
                if store.ping(timeout).await {
                    info!("Index at {} reachable, enabling {}", store.url(), local_index::NAME);
                    registry.insert_front(BackendDescriptor::new(
                        Arc::new(LocalIndex::new(store.clone())),
                        None,
                    ));
                } else {
                    warn!("Index at {} not reachable, {} disabled", store.url(), local_index::NAME);
                }
            }
        }

        info!("Loaded {} backends: {:?}", registry.len(), registry.names());
        registry
    }

    /// Create a backend instance by name
    pub fn create_backend(name: &str, ctx: &BackendContext<'_>) -> Result<Arc<dyn Backend>, BackendError> {
        let constructor = REGISTRATIONS
            .get(name)
            .ok_or_else(|| BackendError::Unavailable(format!("unknown backend: {name}")))?;
        constructor(ctx)
    }

    /// Get list of registered backend names
    pub fn available_backends() -> Vec<&'static str> {
        let mut names: Vec<_> = REGISTRATIONS.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn settings(backends: &[&str]) -> Settings {
        let mut settings = Settings::default();
        settings.search.backends = backends.iter().map(|s| s.to_string()).collect();
        settings
    }

    #[tokio::test]
    async fn test_unknown_and_unconfigured_are_skipped() {
        let client = HttpClient::new().unwrap();
        let settings = settings(&["bing_stub", "nonexistent", "google_cse", "brave_stub", "turso"]);

        let registry = BackendLoader::load(&settings, &client, None).await;
        assert_eq!(registry.names(), vec!["bing_stub", "brave_stub"]);
    }

    #[tokio::test]
    async fn test_credential_map_feeds_constructor() {
        let client = HttpClient::new().unwrap();
        let mut settings = settings(&["serper"]);
        settings.search.api_keys.insert("serper".into(), "from-map".into());

        let registry = BackendLoader::load(&settings, &client, None).await;
        let descriptor = registry.iter().next().unwrap();
        assert_eq!(descriptor.name, "serper");
        assert_eq!(descriptor.credential.as_deref(), Some("from-map"));
    }

    #[tokio::test]
    async fn test_reachable_index_goes_first() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let client = HttpClient::new().unwrap();
        let store = IndexStore::new(client.clone(), &server.uri(), "pages").unwrap();
        let registry = BackendLoader::load(&settings(&["bing_stub"]), &client, Some(&store)).await;

        assert_eq!(registry.names(), vec!["local_index", "bing_stub"]);
    }

    #[tokio::test]
    async fn test_unreachable_index_is_skipped() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = HttpClient::new().unwrap();
        let store = IndexStore::new(client.clone(), &server.uri(), "pages").unwrap();
        let registry = BackendLoader::load(&settings(&["bing_stub"]), &client, Some(&store)).await;

        assert_eq!(registry.names(), vec!["bing_stub"]);
    }

    #[test]
    fn test_available_backends() {
        let names = BackendLoader::available_backends();
        assert!(names.contains(&"google_cse"));
        assert!(names.contains(&"local_index"));
        assert_eq!(names.len(), 8);
    }
}

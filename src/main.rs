//! Compass Search: meta-search aggregation service
//!
//! This is the main entry point for the application.

use anyhow::Result;
use compass_search::{
    backends::BackendLoader,
    config,
    index::IndexStore,
    network::HttpClient,
    web::{create_router, AppState},
};
use std::net::SocketAddr;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    info!("Starting Compass Search v{}", compass_search::VERSION);

    // Load configuration
    let settings = config::load()?;
    info!("Configured backends: {:?}", settings.search.backends);

    // Initialize HTTP client
    let client = HttpClient::with_settings(&settings.outgoing)?;
    info!("HTTP client initialized");

    // Connect the durable index when configured
    let index = match settings.index.url.as_deref() {
        Some(url) => match IndexStore::new(client.clone(), url, settings.index.pages_index.as_str()) {
            Ok(store) => {
                if let Err(e) = store.ensure_index().await {
                    warn!("Could not ensure index {}: {}", store.index_name(), e);
                }
                Some(store)
            }
            Err(e) => {
                warn!("Ignoring OPENSEARCH_URL: {}", e);
                None
            }
        },
        None => None,
    };

    // Load backends
    let registry = BackendLoader::load(&settings, &client, index.as_ref()).await;
    if registry.is_empty() {
        warn!("No backends loaded; every search will return an empty page");
    }

    // Create application state
    let state = AppState::new(settings.clone(), registry, client, index);

    // Create router
    let app = create_router(state);

    // Bind address
    let addr = SocketAddr::new(settings.server.bind_address.parse()?, settings.server.port);

    info!("Starting server on http://{}", addr);

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

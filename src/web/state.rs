//! Application state shared across handlers

use crate::backends::BackendRegistry;
use crate::config::Settings;
use crate::index::IndexStore;
use crate::ingest::Ingestor;
use crate::metrics::Metrics;
use crate::network::HttpClient;
use crate::search::{Aggregator, Search};
use std::sync::Arc;
use std::time::Duration;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Global settings
    pub settings: Arc<Settings>,
    /// Search executor
    pub search: Arc<Search>,
    /// Writes into the durable index
    pub ingestor: Arc<Ingestor>,
    /// Backend call statistics
    pub metrics: Arc<Metrics>,
}

impl AppState {
    /// Create new application state
    pub fn new(
        settings: Settings,
        registry: BackendRegistry,
        client: HttpClient,
        index: Option<IndexStore>,
    ) -> Self {
        let metrics = Arc::new(Metrics::new());
        let aggregator = Aggregator::new(Arc::new(registry))
            .with_timeout(Duration::from_secs_f64(settings.search.backend_timeout))
            .with_max_timeout(Duration::from_secs_f64(settings.search.max_backend_timeout))
            .with_metrics(metrics.clone());
        let search = Search::new(Arc::new(aggregator))
            .with_default_limit(settings.search.default_limit)
            .with_max_limit(settings.search.max_limit);

        let serper_key = settings
            .api_key("serper")
            .map(str::to_string)
            .or_else(|| settings.serper.api_key.clone());
        let ingestor = Ingestor::new(client, index, serper_key);

        Self {
            settings: Arc::new(settings),
            search: Arc::new(search),
            ingestor: Arc::new(ingestor),
            metrics,
        }
    }

    /// Replace the ingestor (useful for testing)
    pub fn with_ingestor(mut self, ingestor: Ingestor) -> Self {
        self.ingestor = Arc::new(ingestor);
        self
    }

    /// Names of the backends actually serving queries
    pub fn loaded_backends(&self) -> Vec<&str> {
        self.search.aggregator().registry().names()
    }
}

//! Concurrent fan-out over every registered backend

use crate::backends::{Backend, BackendRegistry, RequestParams};
use crate::metrics::Metrics;
use crate::results::{ResultContainer, SearchResult};
use futures::future::join_all;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Fans one query out to all backends and merges what comes back.
///
/// Every backend is polled concurrently on the calling task. Outcomes are
/// merged in registry order regardless of completion order, deduplicated by
/// URL (first occurrence wins) and truncated to the requested limit. A
/// failing or slow backend contributes nothing and never fails the call.
pub struct Aggregator {
    /// Backend registry
    registry: Arc<BackendRegistry>,
    /// Call statistics
    metrics: Arc<Metrics>,
    /// Timeout for backends that declare none
    default_timeout: Duration,
    /// Upper bound for any backend timeout
    max_timeout: Duration,
}

impl Aggregator {
    pub fn new(registry: Arc<BackendRegistry>) -> Self {
        Self {
            registry,
            metrics: Arc::new(Metrics::new()),
            default_timeout: Duration::from_secs(10),
            max_timeout: Duration::from_secs(30),
        }
    }

    /// Set default timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    /// Set maximum timeout
    pub fn with_max_timeout(mut self, timeout: Duration) -> Self {
        self.max_timeout = timeout;
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn registry(&self) -> &BackendRegistry {
        &self.registry
    }

    pub fn metrics(&self) -> &Arc<Metrics> {
        &self.metrics
    }

    /// Run `params` against every backend and return the merged page
    pub async fn aggregate(&self, params: &RequestParams) -> Vec<SearchResult> {
        self.metrics.inc_search();
        if params.limit == 0 || self.registry.is_empty() {
            return vec![];
        }

        info!(
            "Aggregating '{}' ({}) over {} backends",
            params.query,
            params.kind,
            self.registry.len()
        );

        let futures = self
            .registry
            .iter()
            .map(|descriptor| self.search_backend(descriptor.instance.clone(), params));

        // join_all yields outputs in input order, which is registry order.
        let outcomes = join_all(futures).await;

        let mut container = ResultContainer::new(params.limit);
        for results in outcomes {
            container.extend_results(results);
            if container.is_full() {
                break;
            }
        }

        debug!("Aggregated {} results", container.result_count());
        container.into_results()
    }

    fn timeout_for(&self, backend: &dyn Backend) -> Duration {
        backend
            .timeout()
            .unwrap_or(self.default_timeout)
            .min(self.max_timeout)
    }

    /// Search a single backend
    async fn search_backend(&self, backend: Arc<dyn Backend>, params: &RequestParams) -> Vec<SearchResult> {
        let name = backend.name().to_string();
        let budget = self.timeout_for(backend.as_ref());
        let start = Instant::now();

        let call = AssertUnwindSafe(backend.search(params)).catch_unwind();
        let outcome = timeout(budget, call).await;
        let elapsed = start.elapsed();
        let elapsed_ms = elapsed.as_millis() as u64;

        match outcome {
            Ok(Ok(Ok(results))) => {
                debug!("Backend {} returned {} results in {:?}", name, results.len(), elapsed);
                self.metrics.record_success(&name, elapsed_ms);
                results
            }
            Ok(Ok(Err(e))) => {
                warn!("Backend {} failed: {}", name, e);
                self.metrics.record_error(&name, elapsed_ms, e.kind());
                vec![]
            }
            Ok(Err(_)) => {
                warn!("Backend {} panicked", name);
                self.metrics.record_error(&name, elapsed_ms, "panic");
                vec![]
            }
            Err(_) => {
                warn!("Timeout for backend {} after {:?}", name, budget);
                self.metrics.record_timeout(&name);
                vec![]
            }
        }
    }
}

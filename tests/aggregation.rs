//! End-to-end aggregation over real backend types and scripted ones

use async_trait::async_trait;
use compass_search::backends::StubBackend;
use compass_search::{
    Aggregator, Backend, BackendError, BackendRegistry, RequestParams, Search, SearchRequest, SearchResult,
};
use std::sync::Arc;
use std::time::Duration;
use tokio_test::assert_ok;

/// Backend answering a fixed list of URLs after an optional delay
struct Scripted {
    name: &'static str,
    urls: Vec<&'static str>,
    delay: Duration,
}

impl Scripted {
    fn new(name: &'static str, urls: &[&'static str], delay_ms: u64) -> Arc<dyn Backend> {
        Arc::new(Self {
            name,
            urls: urls.to_vec(),
            delay: Duration::from_millis(delay_ms),
        })
    }
}

#[async_trait]
impl Backend for Scripted {
    fn name(&self) -> &str {
        self.name
    }

    async fn search(&self, params: &RequestParams) -> Result<Vec<SearchResult>, BackendError> {
        tokio::time::sleep(self.delay).await;
        Ok(self
            .urls
            .iter()
            .take(params.limit)
            .map(|u| SearchResult::new(format!("{} hit", self.name), *u, self.name).unwrap())
            .collect())
    }
}

fn aggregator(backends: Vec<Arc<dyn Backend>>) -> Aggregator {
    let registry: BackendRegistry = backends.into_iter().collect();
    Aggregator::new(Arc::new(registry))
}

fn urls(results: &[SearchResult]) -> Vec<String> {
    results.iter().map(|r| r.url.clone()).collect()
}

#[tokio::test]
async fn overlapping_backends_merge_in_registry_order() {
    let agg = aggregator(vec![
        Scripted::new("a", &["https://u1.example/", "https://u2.example/"], 0),
        Scripted::new("b", &["https://u2.example/", "https://u3.example/"], 0),
    ]);

    let results = agg.aggregate(&RequestParams::new("q")).await;
    assert_eq!(
        urls(&results),
        vec!["https://u1.example/", "https://u2.example/", "https://u3.example/"]
    );
    assert_eq!(results[1].source, "a");
}

#[tokio::test(start_paused = true)]
async fn output_is_stable_under_delay_perturbation() {
    let delays = [(0, 300), (300, 0), (50, 50), (10, 2_000)];
    let mut outputs = Vec::new();

    for (da, db) in delays {
        let agg = aggregator(vec![
            Scripted::new("a", &["https://a1.example/", "https://shared.example/"], da),
            Scripted::new("b", &["https://shared.example/", "https://b1.example/"], db),
        ]);
        outputs.push(urls(&agg.aggregate(&RequestParams::new("q")).await));
    }

    assert!(outputs.windows(2).all(|w| w[0] == w[1]), "{outputs:?}");
}

#[tokio::test]
async fn stub_backends_page_through_search() {
    let agg = aggregator(vec![
        Arc::new(StubBackend::bing()) as Arc<dyn Backend>,
        Arc::new(StubBackend::brave()),
    ]);
    let search = Search::new(Arc::new(agg));

    let page = assert_ok!(search.execute(SearchRequest::simple("tokio").with_limit(15)).await);
    assert_eq!(page.results.len(), 15);
    // The first backend fills the page on its own.
    assert!(page.results.iter().all(|r| r.source == "bing_stub"));

    let next = assert_ok!(
        search
            .execute(
                SearchRequest::simple("tokio")
                    .with_limit(15)
                    .with_cursor(page.next_cursor.unwrap())
            )
            .await
    );
    assert_eq!(next.results[0].url, "https://example.com/bing/16?q=tokio");
}

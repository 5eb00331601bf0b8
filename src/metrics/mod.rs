//! Metrics collection module
//!
//! Tracks per-backend call outcomes and response times for diagnostics.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};

/// Number of response times kept per backend
const WINDOW: usize = 100;

#[derive(Debug, Default)]
struct BackendCounters {
    calls: u64,
    successes: u64,
    errors: u64,
    timeouts: u64,
    last_error: Option<String>,
    response_times: VecDeque<u64>,
}

impl BackendCounters {
    fn push_time(&mut self, time_ms: u64) {
        if self.response_times.len() >= WINDOW {
            self.response_times.pop_front();
        }
        self.response_times.push_back(time_ms);
    }
}

/// Process-wide metrics collector
#[derive(Debug, Default)]
pub struct Metrics {
    /// Total aggregated searches
    total_searches: AtomicU64,
    backends: RwLock<HashMap<String, BackendCounters>>,
}

impl Metrics {
    /// Create a new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment total search count
    pub fn inc_search(&self) {
        self.total_searches.fetch_add(1, Ordering::Relaxed);
    }

    fn with_backend(&self, backend: &str, f: impl FnOnce(&mut BackendCounters)) {
        let mut backends = self.backends.write().unwrap_or_else(PoisonError::into_inner);
        f(backends.entry(backend.to_string()).or_default());
    }

    /// Record a call that returned results (possibly none)
    pub fn record_success(&self, backend: &str, time_ms: u64) {
        self.with_backend(backend, |c| {
            c.calls += 1;
            c.successes += 1;
            c.push_time(time_ms);
        });
    }

    /// Record a call that failed
    pub fn record_error(&self, backend: &str, time_ms: u64, kind: &str) {
        self.with_backend(backend, |c| {
            c.calls += 1;
            c.errors += 1;
            c.last_error = Some(kind.to_string());
            c.push_time(time_ms);
        });
    }

    /// Record a call cut off by its time budget
    pub fn record_timeout(&self, backend: &str) {
        self.with_backend(backend, |c| {
            c.calls += 1;
            c.timeouts += 1;
            c.last_error = Some("timeout".to_string());
        });
    }

    /// Get total searches
    pub fn get_total_searches(&self) -> u64 {
        self.total_searches.load(Ordering::Relaxed)
    }

    /// Get average response time for a backend
    pub fn get_avg_response_time(&self, backend: &str) -> Option<u64> {
        let backends = self.backends.read().unwrap_or_else(PoisonError::into_inner);
        backends.get(backend).and_then(|c| average(&c.response_times))
    }

    /// Get reliability percentage for a backend
    pub fn get_reliability(&self, backend: &str) -> f64 {
        let backends = self.backends.read().unwrap_or_else(PoisonError::into_inner);
        backends.get(backend).map(reliability).unwrap_or(100.0)
    }

    /// Snapshot of every backend seen so far
    pub fn snapshot(&self) -> MetricsSnapshot {
        let backends = self.backends.read().unwrap_or_else(PoisonError::into_inner);
        MetricsSnapshot {
            total_searches: self.get_total_searches(),
            backends: backends
                .iter()
                .map(|(name, c)| {
                    (
                        name.clone(),
                        BackendStats {
                            calls: c.calls,
                            successes: c.successes,
                            errors: c.errors,
                            timeouts: c.timeouts,
                            last_error: c.last_error.clone(),
                            avg_response_time_ms: average(&c.response_times),
                            reliability: reliability(c),
                        },
                    )
                })
                .collect(),
        }
    }
}

fn average(times: &VecDeque<u64>) -> Option<u64> {
    if times.is_empty() {
        None
    } else {
        Some(times.iter().sum::<u64>() / times.len() as u64)
    }
}

fn reliability(c: &BackendCounters) -> f64 {
    if c.calls == 0 {
        100.0
    } else {
        (c.successes as f64 / c.calls as f64) * 100.0
    }
}

/// Statistics for a single backend
#[derive(Debug, Clone, Serialize)]
pub struct BackendStats {
    pub calls: u64,
    pub successes: u64,
    pub errors: u64,
    pub timeouts: u64,
    pub last_error: Option<String>,
    pub avg_response_time_ms: Option<u64>,
    pub reliability: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub total_searches: u64,
    pub backends: BTreeMap<String, BackendStats>,
}

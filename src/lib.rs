//! Compass Search: a meta-search aggregation service
//!
//! A query is fanned out concurrently to a configurable set of search
//! backends; their answers are normalized into one result shape, merged in
//! backend order, deduplicated by URL and returned one page at a time behind
//! an opaque cursor.

pub mod backends;
pub mod cache;
pub mod config;
pub mod error;
pub mod index;
pub mod ingest;
pub mod metrics;
pub mod network;
pub mod results;
pub mod search;
pub mod web;

pub use backends::{Backend, BackendLoader, BackendRegistry, RequestParams, SearchKind};
pub use config::Settings;
pub use error::{BackendError, SearchError};
pub use results::{ResultContainer, ResultPage, SearchResult};
pub use search::{Aggregator, Search, SearchRequest};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

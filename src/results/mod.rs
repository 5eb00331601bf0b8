//! Result types and container for search results
//!
//! Every backend's output is coerced into [`SearchResult`]; the
//! [`ResultContainer`] merges them into one deduplicated, bounded list.

mod container;
mod types;

pub use container::ResultContainer;
pub use types::*;

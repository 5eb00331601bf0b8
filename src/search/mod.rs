//! Search orchestration module
//!
//! Decodes the pagination cursor, fans a query out to every backend and
//! assembles the result page.

mod aggregator;
mod cursor;
mod executor;
mod models;

pub use aggregator::Aggregator;
pub use cursor::{decode_cursor, encode_cursor};
pub use executor::Search;
pub use models::*;

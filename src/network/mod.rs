//! HTTP networking module
//!
//! Provides HTTP client functionality for making requests to search providers.

mod client;
mod request;

pub use client::HttpClient;
pub use request::{BackendRequest, BackendResponse, HttpMethod, RequestBody};

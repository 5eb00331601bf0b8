//! Web server module
//!
//! Provides the JSON HTTP API of Compass Search.

mod handlers;
mod routes;
mod state;

pub use handlers::FetchParams;
pub use routes::create_router;
pub use state::AppState;

//! Search backend module
//!
//! Defines the Backend trait, the backends shipped with the service and the
//! registry the aggregator fans out to.

mod loader;
mod registry;
mod rotator;
mod traits;

// Backend implementations
pub mod compass_ai;
pub mod duckduckgo;
pub mod google_cse;
pub mod local_index;
pub mod serper;
pub mod stub;
pub mod turso;

pub use loader::{BackendContext, BackendLoader};
pub use registry::{BackendDescriptor, BackendRegistry};
pub use rotator::{Credential, CredentialRotator, CredentialSet};
pub use stub::StubBackend;
pub use traits::*;

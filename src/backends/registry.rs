//! Registry of the backends active for this process

use super::traits::Backend;
use std::fmt;
use std::sync::Arc;

/// A constructed backend plus the credential it was built with
#[derive(Clone)]
pub struct BackendDescriptor {
    pub name: String,
    pub credential: Option<String>,
    pub instance: Arc<dyn Backend>,
}

impl BackendDescriptor {
    pub fn new(instance: Arc<dyn Backend>, credential: Option<String>) -> Self {
        Self {
            name: instance.name().to_string(),
            credential,
            instance,
        }
    }
}

impl fmt::Debug for BackendDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendDescriptor")
            .field("name", &self.name)
            .field("credential", &self.credential.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Ordered set of active backends.
///
/// Order is registration order and decides merge priority. Names are unique:
/// registering a name twice keeps the first entry.
#[derive(Debug, Clone, Default)]
pub struct BackendRegistry {
    backends: Vec<BackendDescriptor>,
}

impl BackendRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a backend, returning false if the name is already taken
    pub fn register(&mut self, descriptor: BackendDescriptor) -> bool {
        if self.contains(&descriptor.name) {
            return false;
        }
        self.backends.push(descriptor);
        true
    }

    /// Put a backend ahead of every other one
    pub fn insert_front(&mut self, descriptor: BackendDescriptor) -> bool {
        if self.contains(&descriptor.name) {
            return false;
        }
        self.backends.insert(0, descriptor);
        true
    }

    /// Get a backend by name
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Backend>> {
        self.backends
            .iter()
            .find(|d| d.name == name)
            .map(|d| &d.instance)
    }

    /// Check if a backend exists
    pub fn contains(&self, name: &str) -> bool {
        self.backends.iter().any(|d| d.name == name)
    }

    /// Backend names in registration order
    pub fn names(&self) -> Vec<&str> {
        self.backends.iter().map(|d| d.name.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BackendDescriptor> {
        self.backends.iter()
    }

    /// Get number of registered backends
    pub fn len(&self) -> usize {
        self.backends.len()
    }

    /// Check if registry is empty
    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }
}

impl FromIterator<Arc<dyn Backend>> for BackendRegistry {
    fn from_iter<I: IntoIterator<Item = Arc<dyn Backend>>>(iter: I) -> Self {
        let mut registry = Self::new();
        for backend in iter {
            registry.register(BackendDescriptor::new(backend, None));
        }
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::StubBackend;

    fn descriptor(backend: StubBackend) -> BackendDescriptor {
        BackendDescriptor::new(Arc::new(backend), None)
    }

    #[test]
    fn test_registry_order() {
        let mut registry = BackendRegistry::new();
        assert!(registry.register(descriptor(StubBackend::bing())));
        assert!(registry.register(descriptor(StubBackend::brave())));
        assert!(registry.insert_front(descriptor(StubBackend::new("local_index", "Local"))));

        assert_eq!(registry.names(), vec!["local_index", "bing_stub", "brave_stub"]);
        assert!(registry.get("brave_stub").is_some());
    }

    #[test]
    fn test_duplicate_names_keep_first() {
        let mut registry = BackendRegistry::new();
        registry.register(descriptor(StubBackend::bing()));
        assert!(!registry.register(descriptor(StubBackend::bing())));
        assert!(!registry.insert_front(descriptor(StubBackend::bing())));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_credential_is_redacted() {
        let descriptor = BackendDescriptor::new(Arc::new(StubBackend::bing()), Some("secret".into()));
        assert!(!format!("{descriptor:?}").contains("secret"));
    }
}

//! Ordered collection of loaded classifier backends
//!
//! Registration order is report order. The registry is populated by the
//! loader on its worker context and handed to the owner thread whole;
//! after that hand-off nothing registers into it again.

use std::sync::Arc;

use tracing::debug;

use crate::classifier::Classifier;

/// Ordered backend collection
///
/// Names need not be unique; identity is the backend instance itself.
#[derive(Default)]
pub struct Registry {
    backends: Vec<Arc<dyn Classifier>>,
}

impl Registry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a backend, preserving registration order
    ///
    /// Idempotent by instance identity: registering the same `Arc`
    /// twice keeps a single entry. Two distinct instances with the
    /// same name are both kept.
    pub fn register(&mut self, backend: Arc<dyn Classifier>) {
        if self.backends.iter().any(|b| Arc::ptr_eq(b, &backend)) {
            debug!("register: backend {:?} already registered", backend.name());
            return;
        }
        debug!("register: backend {:?}", backend.name());
        self.backends.push(backend);
    }

    /// Backends in registration order
    pub fn iter(&self) -> impl Iterator<Item = &dyn Classifier> {
        self.backends.iter().map(|b| b.as_ref())
    }

    /// Number of registered backends
    pub fn len(&self) -> usize {
        self.backends.len()
    }

    /// Whether no backend is registered
    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }
}

//! Plugin-based backend registry
//!
//! The registry allows backends to be registered dynamically at runtime,
//! so binaries pick an implementation from configuration without a
//! hardcoded match over every crate they link.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use cfgsync_core::registry::BackendRegistry;
//! use cfgsync_core::config::BackendConfig;
//!
//! let registry = BackendRegistry::with_builtin();
//!
//! let config = BackendConfig::File { path: "settings.json".into() };
//! let backend = registry.create_backend(&config).await?;
//! ```
//!
//! ## Registration
//!
//! Out-of-crate implementations register themselves during initialization:
//!
//! ```rust,ignore
//! // In cfgsync-backend-http crate
//! pub fn register(registry: &BackendRegistry) {
//!     registry.register_backend("http", Box::new(HttpBackendFactory));
//! }
//! ```

mod builtin;

pub use builtin::{FileBackendFactory, MemoryBackendFactory};

use crate::config::BackendConfig;
use crate::error::{Error, Result};
use crate::traits::{Backend, BackendFactory};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Backend registry for plugin-based backend creation
///
/// The registry maintains a map of backend type names to factory objects,
/// allowing dynamic instantiation of backends based on configuration.
///
/// ## Thread Safety
///
/// The registry uses interior mutability with RwLock, allowing concurrent
/// reads and exclusive writes.
#[derive(Default)]
pub struct BackendRegistry {
    backends: RwLock<HashMap<String, Arc<dyn BackendFactory>>>,
}

impl BackendRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the `memory` and `file` backends
    pub fn with_builtin() -> Self {
        let registry = Self::new();
        registry.register_backend("memory", Box::new(MemoryBackendFactory));
        registry.register_backend("file", Box::new(FileBackendFactory));
        registry
    }

    /// Register a backend factory
    ///
    /// # Parameters
    ///
    /// - `name`: Backend type name (e.g., "file", "http")
    /// - `factory`: Factory object for creating backend instances
    ///
    /// Registering an existing name replaces the previous factory.
    pub fn register_backend(&self, name: impl Into<String>, factory: Box<dyn BackendFactory>) {
        let name = name.into();
        tracing::debug!("Registering backend factory: {}", name);
        let mut backends = self
            .backends
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        backends.insert(name, Arc::from(factory));
    }

    /// Create a backend from configuration
    ///
    /// # Returns
    ///
    /// - `Ok(Arc<dyn Backend>)`: Created backend instance
    /// - `Err(Error)`: If the backend type is not registered or creation fails
    pub async fn create_backend(&self, config: &BackendConfig) -> Result<Arc<dyn Backend>> {
        let backend_type = config.type_name();

        let factory = {
            let backends = self
                .backends
                .read()
                .unwrap_or_else(PoisonError::into_inner);
            backends
                .get(backend_type)
                .cloned()
                .ok_or_else(|| Error::config(format!("Unknown backend type: {}", backend_type)))?
        };

        factory.create(config).await
    }

    /// List all registered backend types
    pub fn list_backends(&self) -> Vec<String> {
        let backends = self
            .backends
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<String> = backends.keys().cloned().collect();
        names.sort();
        names
    }

    /// Check if a backend type is registered
    pub fn has_backend(&self, name: &str) -> bool {
        let backends = self
            .backends
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        backends.contains_key(name)
    }
}

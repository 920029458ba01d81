// Factories for the backends shipped with the core crate

use async_trait::async_trait;
use std::sync::Arc;

use crate::backend::{FileBackend, MemoryBackend};
use crate::config::BackendConfig;
use crate::error::{Error, Result};
use crate::traits::{Backend, BackendFactory};

/// Creates a fresh [`MemoryBackend`] per call
pub struct MemoryBackendFactory;

#[async_trait]
impl BackendFactory for MemoryBackendFactory {
    async fn create(&self, config: &BackendConfig) -> Result<Arc<dyn Backend>> {
        match config {
            BackendConfig::Memory => Ok(Arc::new(MemoryBackend::new())),
            other => Err(Error::config(format!(
                "Memory backend factory cannot handle {} config",
                other.type_name()
            ))),
        }
    }
}

/// Opens a [`FileBackend`] at the configured path
pub struct FileBackendFactory;

#[async_trait]
impl BackendFactory for FileBackendFactory {
    async fn create(&self, config: &BackendConfig) -> Result<Arc<dyn Backend>> {
        match config {
            BackendConfig::File { path } => Ok(Arc::new(FileBackend::open(path).await?)),
            other => Err(Error::config(format!(
                "File backend factory cannot handle {} config",
                other.type_name()
            ))),
        }
    }
}

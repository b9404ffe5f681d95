//! Storage manager that dispatches to the configured provider.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use shiphub_core::config::StorageConfig;
use shiphub_core::error::AppError;
use shiphub_core::result::AppResult;
use shiphub_core::traits::storage::DurableStorage;

/// Storage manager that wraps the configured provider.
///
/// The provider is selected at construction time based on configuration.
#[derive(Debug, Clone)]
pub struct StorageManager {
    /// The inner storage provider.
    inner: Arc<dyn DurableStorage>,
}

impl StorageManager {
    /// Create a new storage manager from configuration.
    pub async fn new(config: &StorageConfig) -> AppResult<Self> {
        let inner: Arc<dyn DurableStorage> = match config.provider.as_str() {
            #[cfg(feature = "local")]
            "local" => {
                info!(path = %config.path, "Initializing local file storage provider");
                Arc::new(crate::local::LocalFileStorage::open(&config.path).await?)
            }
            #[cfg(feature = "memory")]
            "memory" => {
                info!("Initializing in-memory storage provider");
                Arc::new(crate::memory::MemoryStorage::new())
            }
            other => {
                return Err(AppError::configuration(format!(
                    "Unknown storage provider: '{other}'. Supported: memory, local"
                )));
            }
        };

        Ok(Self { inner })
    }

    /// Shared handle to the inner provider.
    pub fn provider(&self) -> Arc<dyn DurableStorage> {
        self.inner.clone()
    }
}

#[async_trait]
impl DurableStorage for StorageManager {
    fn provider_type(&self) -> &str {
        self.inner.provider_type()
    }

    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> AppResult<()> {
        self.inner.set(key, value).await
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.inner.delete(key).await
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        self.inner.exists(key).await
    }
}

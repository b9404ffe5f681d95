//! In-memory durable storage using dashmap.
//!
//! Nothing survives the process; used by tests and by `--storage memory`.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;

use shiphub_core::result::AppResult;
use shiphub_core::traits::storage::DurableStorage;

/// Process-local storage provider.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    /// Key → value.
    entries: Arc<DashMap<String, String>>,
}

impl MemoryStorage {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl DurableStorage for MemoryStorage {
    fn provider_type(&self) -> &str {
        "memory"
    }

    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.entries.get(key).map(|v| v.value().clone()))
    }

    async fn set(&self, key: &str, value: &str) -> AppResult<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.entries.remove(key);
        Ok(())
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        Ok(self.entries.contains_key(key))
    }
}

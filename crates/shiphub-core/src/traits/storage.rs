//! Durable client storage trait.

use async_trait::async_trait;

use crate::result::AppResult;

/// Key-value storage that survives process restarts.
///
/// Values are stored as strings (JSON for structured records). Providers
/// must make a completed `set` visible to every other reader of the same
/// backing store before returning.
#[async_trait]
pub trait DurableStorage: Send + Sync + std::fmt::Debug + 'static {
    /// Short provider name for logging.
    fn provider_type(&self) -> &str;

    /// Get a value by key. Returns `None` if the key does not exist.
    async fn get(&self, key: &str) -> AppResult<Option<String>>;

    /// Set a value, replacing any previous one.
    async fn set(&self, key: &str, value: &str) -> AppResult<()>;

    /// Delete a key. Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> AppResult<()>;

    /// Check whether a key exists.
    async fn exists(&self, key: &str) -> AppResult<bool> {
        Ok(self.get(key).await?.is_some())
    }
}

/// Read a typed value stored as JSON.
///
/// Free function so it works through `Arc<dyn DurableStorage>`.
pub async fn read_json<T: serde::de::DeserializeOwned>(
    storage: &dyn DurableStorage,
    key: &str,
) -> AppResult<Option<T>> {
    match storage.get(key).await? {
        Some(value) => {
            let parsed = serde_json::from_str(&value)?;
            Ok(Some(parsed))
        }
        None => Ok(None),
    }
}

/// Serialize a value to JSON and store it under `key`.
pub async fn write_json<T: serde::Serialize + ?Sized>(
    storage: &dyn DurableStorage,
    key: &str,
    value: &T,
) -> AppResult<()> {
    let json = serde_json::to_string(value)?;
    storage.set(key, &json).await
}

//! Local file storage provider.
//!
//! All keys live in one JSON object file. Every mutation rewrites the file
//! (temp file + rename) before returning, so a completed `set` is visible
//! to any other process reading the same path.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::debug;

use shiphub_core::error::{AppError, ErrorKind};
use shiphub_core::result::AppResult;
use shiphub_core::traits::storage::DurableStorage;

/// JSON-file storage provider.
#[derive(Debug)]
pub struct LocalFileStorage {
    /// Path of the backing file.
    path: PathBuf,
    /// In-memory mirror of the file contents.
    entries: Mutex<BTreeMap<String, String>>,
}

impl LocalFileStorage {
    /// Open the store at `path`, loading existing contents.
    ///
    /// A missing file is an empty store. A file that is not a JSON object of
    /// strings is a storage error.
    pub async fn open(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref().to_path_buf();
        let entries = match fs::read_to_string(&path).await {
            Ok(raw) if raw.trim().is_empty() => BTreeMap::new(),
            Ok(raw) => serde_json::from_str(&raw).map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Corrupt storage file: {}", path.display()),
                    e,
                )
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                return Err(AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to read storage file: {}", path.display()),
                    e,
                ));
            }
        };

        debug!(path = %path.display(), keys = entries.len(), "Opened local storage");
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the map to disk atomically.
    async fn flush(&self, entries: &BTreeMap<String, String>) -> AppResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await.map_err(|e| {
                    AppError::with_source(
                        ErrorKind::Storage,
                        format!("Failed to create storage directory: {}", parent.display()),
                        e,
                    )
                })?;
            }
        }

        let json = serde_json::to_string_pretty(entries)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).await?;
        fs::rename(&tmp, &self.path).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to replace storage file: {}", self.path.display()),
                e,
            )
        })
    }
}

#[async_trait]
impl DurableStorage for LocalFileStorage {
    fn provider_type(&self) -> &str {
        "local"
    }

    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> AppResult<()> {
        let mut entries = self.entries.lock().await;
        entries.insert(key.to_string(), value.to_string());
        self.flush(&entries).await
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        let mut entries = self.entries.lock().await;
        if entries.remove(key).is_some() {
            self.flush(&entries).await?;
        }
        Ok(())
    }
}

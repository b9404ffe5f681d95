//! Durable client storage configuration.

use serde::{Deserialize, Serialize};

/// Durable storage provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Provider name: `"memory"` or `"local"`.
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Path of the JSON file used by the `local` provider.
    #[serde(default = "default_path")]
    pub path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            path: default_path(),
        }
    }
}

fn default_provider() -> String {
    "local".to_string()
}

fn default_path() -> String {
    "data/session.json".to_string()
}

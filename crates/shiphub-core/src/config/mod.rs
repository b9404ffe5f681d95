//! Application configuration schemas.
//!
//! All configuration structs are deserialized from a TOML file via the
//! `config` crate, overlaid with `SHIPHUB__*` environment variables. Each
//! sub-module represents a logical configuration section.

pub mod api;
pub mod logging;
pub mod realtime;
pub mod storage;

use serde::{Deserialize, Serialize};

pub use self::api::ApiConfig;
pub use self::logging::LoggingConfig;
pub use self::realtime::{NotificationFeedConfig, RealtimeConfig, ReconnectConfig};
pub use self::storage::StorageConfig;

use crate::error::AppError;

/// Root application configuration.
///
/// Every section carries serde defaults, so an empty source produces a
/// usable configuration identical to [`AppConfig::default`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// REST API settings (auth collaborator).
    #[serde(default)]
    pub api: ApiConfig,
    /// Durable client storage settings.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Realtime transport and notification feed settings.
    #[serde(default)]
    pub realtime: RealtimeConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    ///
    /// The file is optional. Environment variables prefixed with `SHIPHUB`
    /// (sections separated by `__`, e.g. `SHIPHUB__API__BASE_URL`) override
    /// file values.
    pub fn load(path: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix("SHIPHUB")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }
}

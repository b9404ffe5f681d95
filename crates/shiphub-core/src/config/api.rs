//! REST API (auth collaborator) configuration.

use serde::{Deserialize, Serialize};

/// Settings for the remote REST API used for sign-in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the API, without a trailing slash.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Path of the login endpoint, appended to `base_url`.
    #[serde(default = "default_login_path")]
    pub login_path: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl ApiConfig {
    /// Full URL of the login endpoint.
    pub fn login_url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), self.login_path)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            login_path: default_login_path(),
            timeout_seconds: default_timeout(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:3000/api".to_string()
}

fn default_login_path() -> String {
    "/auth/login".to_string()
}

fn default_timeout() -> u64 {
    30
}

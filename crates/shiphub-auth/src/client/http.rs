//! reqwest-backed auth collaborator.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use shiphub_core::config::ApiConfig;
use shiphub_core::error::{AppError, ErrorKind};
use shiphub_core::result::AppResult;
use shiphub_core::traits::storage::{DurableStorage, read_json, write_json};
use shiphub_entity::session::StoredCredentials;
use shiphub_entity::user::UserRole;
use shiphub_storage::keys;

use super::{AuthApi, AuthFailure, LoginRequest, SignInResponse};

/// Auth collaborator talking to the REST API and durable storage.
#[derive(Debug, Clone)]
pub struct HttpAuthClient {
    /// HTTP client.
    http: reqwest::Client,
    /// Full login endpoint URL.
    login_url: String,
    /// Durable storage holding the credential pair.
    storage: Arc<dyn DurableStorage>,
}

impl HttpAuthClient {
    /// Create a client from API configuration.
    pub fn new(config: &ApiConfig, storage: Arc<dyn DurableStorage>) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| {
                AppError::with_source(ErrorKind::Configuration, "Failed to build HTTP client", e)
            })?;

        Ok(Self {
            http,
            login_url: config.login_url(),
            storage,
        })
    }
}

#[async_trait]
impl AuthApi for HttpAuthClient {
    async fn sign_in(&self, request: &LoginRequest) -> Result<SignInResponse, AuthFailure> {
        debug!(email = %request.email, url = %self.login_url, "Signing in");

        let response = self
            .http
            .post(&self.login_url)
            .json(request)
            .send()
            .await
            .map_err(|e| AuthFailure::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return response
                .json::<SignInResponse>()
                .await
                .map_err(|e| AuthFailure::InvalidResponse(e.to_string()));
        }

        let body = response.text().await.unwrap_or_default();
        Err(AuthFailure::Rejected {
            status: status.as_u16(),
            message: server_message(&body),
        })
    }

    async fn sign_out(&self) -> AppResult<()> {
        self.storage.delete(keys::CREDENTIALS).await
    }

    async fn get_token(&self) -> AppResult<Option<StoredCredentials>> {
        read_json(self.storage.as_ref(), keys::CREDENTIALS).await
    }

    async fn set_token(&self, token: &str, role: UserRole) -> AppResult<()> {
        write_json(
            self.storage.as_ref(),
            keys::CREDENTIALS,
            &StoredCredentials::new(token, role),
        )
        .await
    }
}

/// Extract `message` from an error body.
///
/// Accepts a plain string or a list of strings (joined with `", "`).
fn server_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    let message = match value.get("message")? {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Array(items) => items
            .iter()
            .filter_map(|item| item.as_str())
            .collect::<Vec<_>>()
            .join(", "),
        _ => return None,
    };

    let message = message.trim();
    if message.is_empty() {
        None
    } else {
        Some(message.to_string())
    }
}

//! Upstream auth collaborator.
//!
//! [`AuthApi`] is the boundary to the remote sign-in endpoint and to the
//! durable credential pair. The session store only talks to this trait.

pub mod http;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use shiphub_core::error::{AppError, ErrorKind};
use shiphub_core::result::AppResult;
use shiphub_entity::session::StoredCredentials;
use shiphub_entity::user::{User, UserRole};

pub use http::HttpAuthClient;

/// Message shown when a login failure carries no server message.
pub const DEFAULT_LOGIN_ERROR: &str = "Login failed. Please check your credentials.";

/// Credentials submitted to the sign-in endpoint.
#[derive(Clone, Serialize, Validate)]
pub struct LoginRequest {
    /// Login email address.
    #[validate(email(message = "Please enter a valid email address"))]
    pub email: String,
    /// Plain-text password, only ever sent to the API.
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

impl LoginRequest {
    /// Build a request, trimming the email.
    pub fn new(email: &str, password: &str) -> Self {
        Self {
            email: email.trim().to_string(),
            password: password.to_string(),
        }
    }

    /// Validate the request, returning the first human-readable problem.
    pub fn check(&self) -> Result<(), String> {
        self.validate().map_err(|e| first_validation_message(&e))
    }
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Successful sign-in body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignInResponse {
    /// Bearer token for subsequent requests and the realtime handshake.
    pub access_token: String,
    /// The signed-in user.
    pub user: User,
}

/// Why a sign-in attempt failed.
#[derive(Debug, Clone, Error)]
pub enum AuthFailure {
    /// The server answered with a non-success status.
    #[error("sign-in rejected with status {status}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Structured message from the response body, if any.
        message: Option<String>,
    },
    /// The request never produced a response.
    #[error("auth service unreachable: {0}")]
    Transport(String),
    /// The server answered 2xx with an unexpected body.
    #[error("invalid sign-in response: {0}")]
    InvalidResponse(String),
}

impl AuthFailure {
    /// Message to show the user: the server's own text when present,
    /// otherwise a generic one.
    pub fn user_message(&self) -> String {
        match self {
            Self::Rejected {
                message: Some(message),
                ..
            } => message.clone(),
            _ => DEFAULT_LOGIN_ERROR.to_string(),
        }
    }
}

impl From<AuthFailure> for AppError {
    fn from(failure: AuthFailure) -> Self {
        let kind = match failure {
            AuthFailure::Rejected { .. } => ErrorKind::Authentication,
            AuthFailure::Transport(_) | AuthFailure::InvalidResponse(_) => {
                ErrorKind::ExternalService
            }
        };
        let message = failure.user_message();
        AppError::with_source(kind, message, failure)
    }
}

/// The upstream auth collaborator.
#[async_trait]
pub trait AuthApi: Send + Sync + std::fmt::Debug + 'static {
    /// Exchange credentials for a token and user record.
    async fn sign_in(&self, request: &LoginRequest) -> Result<SignInResponse, AuthFailure>;

    /// Clear the durable credential pair.
    async fn sign_out(&self) -> AppResult<()>;

    /// Read the durable credential pair.
    async fn get_token(&self) -> AppResult<Option<StoredCredentials>>;

    /// Write the durable credential pair.
    async fn set_token(&self, token: &str, role: UserRole) -> AppResult<()>;
}

fn first_validation_message(errors: &ValidationErrors) -> String {
    errors
        .field_errors()
        .values()
        .flat_map(|errs| errs.iter())
        .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
        .unwrap_or_else(|| "Invalid login details".to_string())
}

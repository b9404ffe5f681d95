//! Session store: the single owner of client-side authentication state.
//!
//! State is published on a `watch` channel. Observers (the realtime
//! connection manager, role guards) subscribe instead of polling.

use std::sync::Arc;

use tokio::sync::{Mutex, watch};
use tracing::{debug, info, warn};

use shiphub_core::error::{AppError, ErrorKind};
use shiphub_core::result::AppResult;
use shiphub_core::traits::storage::{DurableStorage, write_json};
use shiphub_entity::session::AuthState;
use shiphub_entity::user::User;
use shiphub_storage::keys;

use crate::client::{AuthApi, LoginRequest};

/// Owns the authentication state and its durable copy.
///
/// Logins are serialized against each other but not against `logout`: a
/// logout that lands while a login is awaiting the collaborator is
/// overwritten by that login's outcome.
#[derive(Debug)]
pub struct SessionStore {
    /// Upstream auth collaborator.
    api: Arc<dyn AuthApi>,
    /// Durable storage holding the user record.
    storage: Arc<dyn DurableStorage>,
    /// Current state; the sender is the source of truth.
    state: watch::Sender<AuthState>,
    /// Held for the duration of a login.
    login_gate: Mutex<()>,
}

impl SessionStore {
    /// Creates an empty, unresolved session store.
    pub fn new(api: Arc<dyn AuthApi>, storage: Arc<dyn DurableStorage>) -> Self {
        let (state, _) = watch::channel(AuthState::default());
        Self {
            api,
            storage,
            state,
            login_gate: Mutex::new(()),
        }
    }

    /// Subscribes to state changes.
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    /// Returns a snapshot of the current state.
    pub fn state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    /// Whether a session is established.
    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated
    }

    /// Signs in with email and password.
    ///
    /// On success the credential pair and user record are written to durable
    /// storage before the in-memory state flips to authenticated. On failure
    /// the state records a user-facing message and the error is returned.
    /// A concurrent call while a login is in flight is rejected with
    /// `Conflict` and leaves the state untouched.
    pub async fn login(&self, email: &str, password: &str) -> AppResult<User> {
        let Ok(_gate) = self.login_gate.try_lock() else {
            warn!(email = %email, "Login rejected: another login is in flight");
            return Err(AppError::conflict("A login is already in progress"));
        };

        self.state.send_modify(|s| {
            s.is_loading = true;
            s.error = None;
        });

        let request = LoginRequest::new(email, password);
        if let Err(message) = request.check() {
            debug!(email = %request.email, reason = %message, "Login request invalid");
            self.fail_login(message.clone());
            return Err(AppError::validation(message));
        }

        let response = match self.api.sign_in(&request).await {
            Ok(response) => response,
            Err(failure) => {
                warn!(email = %request.email, error = %failure, "Login failed");
                self.fail_login(failure.user_message());
                return Err(failure.into());
            }
        };

        if let Err(e) = self.persist(&response.access_token, &response.user).await {
            warn!(error = %e, "Failed to persist session; rolling back");
            self.wipe_durable().await;
            self.fail_login("Unable to save your session. Please try again.".to_string());
            return Err(e);
        }

        info!(
            user_id = %response.user.id,
            role = %response.user.role,
            "Login succeeded"
        );
        self.state.send_replace(AuthState::authenticated(
            response.user.clone(),
            response.access_token,
        ));

        Ok(response.user)
    }

    /// Signs out: clears durable credentials and resets to unauthenticated.
    ///
    /// Never fails; collaborator or storage errors are logged.
    pub async fn logout(&self) {
        if let Err(e) = self.api.sign_out().await {
            warn!(error = %e, "Auth collaborator failed to clear credentials");
        }
        self.wipe_durable().await;
        self.state.send_replace(AuthState::signed_out(None));
        info!("Logged out");
    }

    /// Restores the session from durable storage.
    ///
    /// Never fails: a missing session resolves to unauthenticated, a corrupt
    /// one is wiped (logout-equivalent) and also resolves to unauthenticated.
    pub async fn check_auth(&self) -> AuthState {
        self.state.send_modify(|s| s.is_loading = true);

        match self.restore().await {
            Ok(Some(state)) => {
                info!(role = ?state.role(), "Session restored");
                self.state.send_replace(state.clone());
                state
            }
            Ok(None) => {
                debug!("No stored session");
                let state = AuthState::signed_out(None);
                self.state.send_replace(state.clone());
                state
            }
            Err(e) if matches!(e.kind, ErrorKind::Session | ErrorKind::Serialization) => {
                warn!(error = %e, "Stored session is corrupt; clearing it");
                self.logout().await;
                self.state()
            }
            Err(e) => {
                warn!(error = %e, "Session restore failed");
                let state = AuthState::signed_out(None);
                self.state.send_replace(state.clone());
                state
            }
        }
    }

    /// Persists and replaces the user record without touching the token or
    /// the authenticated flag.
    pub async fn set_user(&self, user: User) -> AppResult<()> {
        write_json(self.storage.as_ref(), keys::USER, &user).await?;
        self.state.send_modify(|s| s.user = Some(user));
        Ok(())
    }

    /// Clears the last error only.
    pub fn clear_error(&self) {
        self.state.send_if_modified(|s| s.error.take().is_some());
    }

    async fn restore(&self) -> AppResult<Option<AuthState>> {
        let credentials = self.api.get_token().await?;
        let raw_user = self.storage.get(keys::USER).await?;

        match (credentials, raw_user) {
            (Some(credentials), Some(raw_user)) => {
                let user: User = serde_json::from_str(&raw_user).map_err(|e| {
                    AppError::with_source(ErrorKind::Session, "Stored user record is corrupt", e)
                })?;

                // Rewrite both keys so a half-written pair from a previous
                // run cannot survive the reload.
                self.persist(&credentials.token, &user).await?;

                Ok(Some(AuthState::authenticated(user, credentials.token)))
            }
            (None, None) => Ok(None),
            (credentials, user) => Err(AppError::session(format!(
                "Partial session in storage (credentials: {}, user: {})",
                credentials.is_some(),
                user.is_some()
            ))),
        }
    }

    async fn persist(&self, token: &str, user: &User) -> AppResult<()> {
        self.api.set_token(token, user.role).await?;
        write_json(self.storage.as_ref(), keys::USER, user).await
    }

    async fn wipe_durable(&self) {
        for key in keys::SESSION_KEYS {
            if let Err(e) = self.storage.delete(key).await {
                warn!(key = %key, error = %e, "Failed to clear stored session key");
            }
        }
    }

    fn fail_login(&self, message: String) {
        self.state.send_replace(AuthState::signed_out(Some(message)));
    }
}

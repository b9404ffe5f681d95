//! Client-side authentication state.

use serde::{Deserialize, Serialize};

use crate::user::{User, UserRole};

/// Snapshot of the session held by the session store.
///
/// `is_authenticated` is only ever `true` together with a present `user`
/// and `token`; use [`AuthState::authenticated`] to build such a state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthState {
    /// The signed-in user.
    pub user: Option<User>,
    /// Bearer token for API and realtime handshakes.
    pub token: Option<String>,
    /// Whether the session is established.
    pub is_authenticated: bool,
    /// Whether a login or session restore is in flight.
    pub is_loading: bool,
    /// Last authentication failure message.
    pub error: Option<String>,
    /// Whether the auth status has been resolved at least once.
    pub initialized: bool,
}

impl AuthState {
    /// An established session.
    pub fn authenticated(user: User, token: impl Into<String>) -> Self {
        Self {
            user: Some(user),
            token: Some(token.into()),
            is_authenticated: true,
            is_loading: false,
            error: None,
            initialized: true,
        }
    }

    /// A resolved, signed-out state with an optional failure message.
    pub fn signed_out(error: Option<String>) -> Self {
        Self {
            user: None,
            token: None,
            is_authenticated: false,
            is_loading: false,
            error,
            initialized: true,
        }
    }

    /// Role of the signed-in user, if any.
    pub fn role(&self) -> Option<UserRole> {
        self.user.as_ref().map(|u| u.role)
    }

    /// Token of an authenticated session only.
    pub fn active_token(&self) -> Option<&str> {
        if self.is_authenticated {
            self.token.as_deref()
        } else {
            None
        }
    }

    /// Check the authenticated/user/token invariant.
    pub fn is_consistent(&self) -> bool {
        !self.is_authenticated || (self.user.is_some() && self.token.is_some())
    }
}

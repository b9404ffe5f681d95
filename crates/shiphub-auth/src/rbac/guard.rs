//! Role gate for a protected view.

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;

use shiphub_entity::session::AuthState;
use shiphub_entity::user::{LOGIN_PATH, UserRole};

/// Outcome of evaluating a guard against a session snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum GuardDecision {
    /// Auth status is still being resolved; render a loading indicator.
    Checking,
    /// No session; send the user to the login page.
    Unauthorized {
        /// Redirect target.
        redirect: &'static str,
    },
    /// Signed in with a role outside the allowed set; send the user to
    /// their own landing page.
    WrongRole {
        /// The session's role.
        role: UserRole,
        /// Redirect target.
        redirect: &'static str,
    },
    /// Render the protected content.
    Authorized,
}

impl GuardDecision {
    /// Whether the protected content may render.
    pub fn is_authorized(&self) -> bool {
        matches!(self, Self::Authorized)
    }

    /// Whether the decision is final (not `Checking`).
    pub fn is_resolved(&self) -> bool {
        !matches!(self, Self::Checking)
    }

    /// Redirect target, if the decision navigates away.
    pub fn redirect(&self) -> Option<&'static str> {
        match self {
            Self::Unauthorized { redirect } | Self::WrongRole { redirect, .. } => Some(redirect),
            Self::Checking | Self::Authorized => None,
        }
    }
}

impl fmt::Display for GuardDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Checking => write!(f, "checking"),
            Self::Unauthorized { redirect } => write!(f, "unauthorized -> {redirect}"),
            Self::WrongRole { role, redirect } => write!(f, "wrong role {role} -> {redirect}"),
            Self::Authorized => write!(f, "authorized"),
        }
    }
}

/// Access gate parameterized by a set of allowed roles.
///
/// `SuperAdmin` always passes regardless of the allowed set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleGuard {
    allowed: HashSet<UserRole>,
}

impl RoleGuard {
    /// Creates a guard for the given roles.
    pub fn new(allowed: impl IntoIterator<Item = UserRole>) -> Self {
        Self {
            allowed: allowed.into_iter().collect(),
        }
    }

    /// The allowed role set.
    pub fn allowed(&self) -> &HashSet<UserRole> {
        &self.allowed
    }

    /// Whether a role passes this gate.
    pub fn permits(&self, role: UserRole) -> bool {
        role.is_super_admin() || self.allowed.contains(&role)
    }

    /// Decides what to render for the given session snapshot.
    pub fn evaluate(&self, state: &AuthState) -> GuardDecision {
        if !state.initialized || state.is_loading {
            return GuardDecision::Checking;
        }

        let Some(role) = state.role().filter(|_| state.is_authenticated) else {
            return GuardDecision::Unauthorized {
                redirect: LOGIN_PATH,
            };
        };

        if self.permits(role) {
            GuardDecision::Authorized
        } else {
            GuardDecision::WrongRole {
                role,
                redirect: role.landing_path(),
            }
        }
    }
}

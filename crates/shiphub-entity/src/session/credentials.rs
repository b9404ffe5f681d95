//! Persisted bearer credential.

use serde::{Deserialize, Serialize};

use crate::user::UserRole;

/// The token+role pair kept in durable storage.
///
/// The role travels with the token so that request-routing layers can
/// gate pages without parsing the user record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCredentials {
    /// Opaque bearer token.
    pub token: String,
    /// Role of the token's owner.
    pub role: UserRole,
}

impl StoredCredentials {
    /// Create a credential pair.
    pub fn new(token: impl Into<String>, role: UserRole) -> Self {
        Self {
            token: token.into(),
            role,
        }
    }
}

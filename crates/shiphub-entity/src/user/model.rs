//! User identity record.

use serde::{Deserialize, Serialize};

use super::role::UserRole;

/// The signed-in identity returned by the API and cached in durable storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique user identifier.
    pub id: String,
    /// Login email address.
    pub email: String,
    /// Human-readable display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Dashboard role.
    pub role: UserRole,
    /// Contact phone number.
    #[serde(default)]
    pub phone: Option<String>,
}

impl User {
    /// Name to show in the UI, falling back to the email address.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.email)
    }

    /// Check if this user holds the universal super-role.
    pub fn is_super_admin(&self) -> bool {
        self.role.is_super_admin()
    }
}

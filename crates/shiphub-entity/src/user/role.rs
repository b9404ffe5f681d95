//! User role enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Path of the login page, the redirect target for unauthenticated access.
pub const LOGIN_PATH: &str = "/login";

/// Roles available in the dashboard.
///
/// `SuperAdmin` is the universal role: it passes every role gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    /// Platform owner, allowed everywhere.
    SuperAdmin,
    /// Back-office administrator.
    Admin,
    /// Merchant shipping orders.
    Merchant,
    /// Courier delivering orders.
    Courier,
}

impl UserRole {
    /// Every role, in declaration order.
    pub const ALL: [UserRole; 4] = [Self::SuperAdmin, Self::Admin, Self::Merchant, Self::Courier];

    /// Check if this role is the universal super-role.
    pub fn is_super_admin(&self) -> bool {
        matches!(self, Self::SuperAdmin)
    }

    /// Landing page of the role's own dashboard area.
    pub fn landing_path(&self) -> &'static str {
        match self {
            Self::SuperAdmin | Self::Admin => "/admin",
            Self::Merchant => "/merchant",
            Self::Courier => "/courier",
        }
    }

    /// Return the role in its wire form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SuperAdmin => "SUPER_ADMIN",
            Self::Admin => "ADMIN",
            Self::Merchant => "MERCHANT",
            Self::Courier => "COURIER",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = shiphub_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().replace('-', "_").as_str() {
            "SUPER_ADMIN" | "SUPERADMIN" => Ok(Self::SuperAdmin),
            "ADMIN" => Ok(Self::Admin),
            "MERCHANT" => Ok(Self::Merchant),
            "COURIER" => Ok(Self::Courier),
            _ => Err(shiphub_core::AppError::validation(format!(
                "Invalid user role: '{s}'. Expected one of: SUPER_ADMIN, ADMIN, MERCHANT, COURIER"
            ))),
        }
    }
}

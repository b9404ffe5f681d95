//! Notification type enumeration.

use serde::{Deserialize, Serialize};

/// Kind of an in-app notification.
///
/// Unknown wire values deserialize as [`NotificationType::General`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationType {
    /// An order's status changed.
    OrderUpdate,
    /// An order was assigned to a courier.
    OrderAssigned,
    /// Platform-wide announcement.
    System,
    /// Anything else.
    #[default]
    #[serde(other)]
    General,
}

impl NotificationType {
    /// Return the type in its wire form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OrderUpdate => "ORDER_UPDATE",
            Self::OrderAssigned => "ORDER_ASSIGNED",
            Self::System => "SYSTEM",
            Self::General => "GENERAL",
        }
    }
}

impl std::fmt::Display for NotificationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

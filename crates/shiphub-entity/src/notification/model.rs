//! Notification record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::kind::NotificationType;

/// A normalized entry of the in-app notification feed.
///
/// Every field has a serde default so a partially filled realtime payload
/// still yields a record instead of failing the whole event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    /// Unique notification identifier.
    #[serde(default)]
    pub id: String,
    /// The recipient user.
    #[serde(default)]
    pub user_id: String,
    /// Notification type.
    #[serde(rename = "type", default)]
    pub kind: NotificationType,
    /// Notification title.
    #[serde(default)]
    pub title: String,
    /// Notification body text.
    #[serde(default)]
    pub message: String,
    /// Whether the user has read this notification.
    #[serde(default)]
    pub is_read: bool,
    /// Opaque payload attached by the producer.
    #[serde(default)]
    pub metadata: serde_json::Value,
    /// When the notification was created.
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Check if the notification has not been read yet.
    pub fn is_unread(&self) -> bool {
        !self.is_read
    }
}

//! Realtime wire frames and the payloads of the order events.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Already-normalized notification record, forwarded verbatim to the feed.
pub const NOTIFICATION_EVENT: &str = "notification";
/// An order changed status.
pub const ORDER_UPDATED_EVENT: &str = "order:updated";
/// An order was assigned to a courier.
pub const ORDER_ASSIGNED_EVENT: &str = "order:assigned";

/// Frame received from the server: `{"event": ..., "data": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InboundFrame {
    /// Event name.
    pub event: String,
    /// Event payload.
    #[serde(default)]
    pub data: Value,
}

impl InboundFrame {
    /// Builds a frame.
    pub fn new(event: impl Into<String>, data: Value) -> Self {
        Self {
            event: event.into(),
            data,
        }
    }
}

/// Frame sent to the server, same shape as [`InboundFrame`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutboundFrame {
    /// Event name.
    pub event: String,
    /// Event payload.
    #[serde(default)]
    pub data: Value,
}

impl OutboundFrame {
    /// Builds a frame.
    pub fn new(event: impl Into<String>, data: Value) -> Self {
        Self {
            event: event.into(),
            data,
        }
    }
}

/// Payload of [`ORDER_UPDATED_EVENT`].
///
/// Missing fields default to empty strings; numbers are accepted and
/// rendered as text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrderUpdatedEvent {
    /// Order identifier.
    #[serde(deserialize_with = "lenient_string")]
    pub order_id: String,
    /// User to notify.
    #[serde(deserialize_with = "lenient_string")]
    pub user_id: String,
    /// Public tracking number.
    #[serde(deserialize_with = "lenient_string")]
    pub tracking_number: String,
    /// New order status.
    #[serde(deserialize_with = "lenient_string")]
    pub status: String,
}

/// Payload of [`ORDER_ASSIGNED_EVENT`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrderAssignedEvent {
    /// Order identifier.
    #[serde(deserialize_with = "lenient_string")]
    pub order_id: String,
    /// Courier the order was assigned to.
    #[serde(deserialize_with = "lenient_string")]
    pub courier_id: String,
    /// Public tracking number.
    #[serde(deserialize_with = "lenient_string")]
    pub tracking_number: String,
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => String::new(),
    })
}

//! Builds notification records from order events.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde_json::Value;

use shiphub_entity::notification::{Notification, NotificationType};

use crate::message::types::{OrderAssignedEvent, OrderUpdatedEvent};

/// Formats notification records for order events.
pub struct NotificationFormatter;

impl NotificationFormatter {
    /// Record for an order status change, addressed to `event.user_id`.
    pub fn order_updated(event: &OrderUpdatedEvent, raw: &Value, at: DateTime<Utc>) -> Notification {
        Notification {
            id: order_notification_id(&event.order_id, at),
            user_id: event.user_id.clone(),
            kind: NotificationType::OrderUpdate,
            title: "Order Updated".to_string(),
            message: format!("Order {} is now {}", event.tracking_number, event.status),
            is_read: false,
            metadata: raw.clone(),
            created_at: at,
        }
    }

    /// Record for an order assignment, addressed to the courier.
    pub fn order_assigned(
        event: &OrderAssignedEvent,
        raw: &Value,
        at: DateTime<Utc>,
    ) -> Notification {
        Notification {
            id: order_notification_id(&event.order_id, at),
            user_id: event.courier_id.clone(),
            kind: NotificationType::OrderAssigned,
            title: "New Order Assigned".to_string(),
            message: format!("Order {} has been assigned to you", event.tracking_number),
            is_read: false,
            metadata: raw.clone(),
            created_at: at,
        }
    }
}

/// Per-process counter keeping ids unique within one millisecond.
static ORDER_SEQ: AtomicU64 = AtomicU64::new(0);

/// `order-<orderId>-<unix millis>-<seq>`.
fn order_notification_id(order_id: &str, at: DateTime<Utc>) -> String {
    let seq = ORDER_SEQ.fetch_add(1, Ordering::Relaxed);
    format!("order-{order_id}-{}-{seq}", at.timestamp_millis())
}

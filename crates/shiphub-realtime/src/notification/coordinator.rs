//! Notification coordinator: realtime events in, feed entries out.
//!
//! While the connection is up the coordinator listens to the three
//! notification-bearing events, turns them into [`Notification`] records,
//! feeds the store and mirrors each record to the platform when permitted.
//!
//! Coordinators feeding the same store on the same connection share one
//! handler set, so an event is delivered once however many of them are
//! active. The platform of the first coordinator built for a store is the
//! one that shows notifications.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Utc;
use serde_json::Value;
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};
use uuid::Uuid;

use shiphub_entity::notification::Notification;

use crate::connection::manager::ConnectionManager;
use crate::connection::registry::{EventHandlerRef, HandlerSet};
use crate::connection::state::ConnectionState;
use crate::message::types::{
    NOTIFICATION_EVENT, ORDER_ASSIGNED_EVENT, ORDER_UPDATED_EVENT, OrderAssignedEvent,
    OrderUpdatedEvent,
};

use super::formatter::NotificationFormatter;
use super::platform::{NotificationPlatform, PermissionState};
use super::store::NotificationStore;

/// Attaches notification handlers to the connection while it is up.
pub struct NotificationCoordinator {
    connection: Arc<ConnectionManager>,
    platform: Arc<dyn NotificationPlatform>,
    /// Shared with every coordinator feeding the same store.
    handlers: Arc<HandlerSet>,
    active: AtomicBool,
    permission_asked: AtomicBool,
}

impl std::fmt::Debug for NotificationCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationCoordinator")
            .field("active", &self.is_active())
            .field("handlers", &self.handlers)
            .field("platform", &self.platform)
            .finish_non_exhaustive()
    }
}

/// Everything a handler needs to deliver a record.
#[derive(Debug, Clone)]
struct Sink {
    store: Arc<NotificationStore>,
    platform: Arc<dyn NotificationPlatform>,
}

impl Sink {
    fn deliver(&self, notification: Notification) {
        let title = notification.title.clone();
        let message = notification.message.clone();
        self.store.add_notification(notification);

        if self.platform.permission() == PermissionState::Granted {
            self.platform.show(&title, &message);
        }
    }
}

impl NotificationCoordinator {
    /// Creates an inactive coordinator.
    pub fn new(
        connection: Arc<ConnectionManager>,
        store: Arc<NotificationStore>,
        platform: Arc<dyn NotificationPlatform>,
    ) -> Self {
        let key = format!("notification-store@{:p}", Arc::as_ptr(&store));
        let sink = Sink {
            store,
            platform: platform.clone(),
        };
        let handlers = connection
            .listeners()
            .handler_set(&key, move || build_handlers(sink));

        Self {
            connection,
            platform,
            handlers,
            active: AtomicBool::new(false),
            permission_asked: AtomicBool::new(false),
        }
    }

    /// Whether the handlers are attached.
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Attaches the handlers and, the first time only, asks for platform
    /// permission if it is still undecided. Repeated calls are no-ops.
    pub async fn activate(&self) {
        if !self.active.swap(true, Ordering::SeqCst) {
            self.handlers.attach(self.connection.listeners());
            info!(
                holders = self.handlers.holders(),
                "Notification coordinator activated"
            );
        }

        if self.permission_asked.swap(true, Ordering::SeqCst) {
            return;
        }
        if self.platform.permission() == PermissionState::Default {
            let outcome = self.platform.request_permission().await;
            info!(permission = %outcome, "Platform notification permission resolved");
        }
    }

    /// Detaches the handlers. Safe when never activated. The handlers stay
    /// registered while another coordinator on the same store is active.
    pub fn deactivate(&self) {
        if self.active.swap(false, Ordering::SeqCst) {
            self.handlers.detach(self.connection.listeners());
            info!(
                holders = self.handlers.holders(),
                "Notification coordinator deactivated"
            );
        }
    }

    /// Follows the connection state until shutdown: active while connected,
    /// inactive otherwise.
    pub async fn run(
        &self,
        mut state: watch::Receiver<ConnectionState>,
        mut shutdown: broadcast::Receiver<()>,
    ) {
        loop {
            let connected = state.borrow_and_update().is_connected();
            if connected {
                self.activate().await;
            } else {
                self.deactivate();
            }

            tokio::select! {
                changed = state.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                _ = shutdown.recv() => {
                    debug!("Notification coordinator received shutdown");
                    break;
                }
            }
        }

        self.deactivate();
    }
}

fn build_handlers(sink: Sink) -> Vec<(&'static str, EventHandlerRef)> {
    let notification: EventHandlerRef = {
        let sink = sink.clone();
        Arc::new(move |data: &Value| on_notification(&sink, data))
    };
    let order_updated: EventHandlerRef = {
        let sink = sink.clone();
        Arc::new(move |data: &Value| on_order_updated(&sink, data))
    };
    let order_assigned: EventHandlerRef =
        Arc::new(move |data: &Value| on_order_assigned(&sink, data));

    vec![
        (NOTIFICATION_EVENT, notification),
        (ORDER_UPDATED_EVENT, order_updated),
        (ORDER_ASSIGNED_EVENT, order_assigned),
    ]
}

fn on_notification(sink: &Sink, data: &Value) {
    match serde_json::from_value::<Notification>(data.clone()) {
        Ok(mut notification) => {
            if notification.id.trim().is_empty() {
                notification.id = format!("notification-{}", Uuid::new_v4());
                debug!(notification_id = %notification.id, "Assigned id to notification without one");
            }
            sink.deliver(notification)
        }
        Err(e) => warn!(event = NOTIFICATION_EVENT, error = %e, "Skipping malformed notification"),
    }
}

fn on_order_updated(sink: &Sink, data: &Value) {
    match serde_json::from_value::<OrderUpdatedEvent>(data.clone()) {
        Ok(event) => sink.deliver(NotificationFormatter::order_updated(&event, data, Utc::now())),
        Err(e) => warn!(event = ORDER_UPDATED_EVENT, error = %e, "Skipping malformed order event"),
    }
}

fn on_order_assigned(sink: &Sink, data: &Value) {
    match serde_json::from_value::<OrderAssignedEvent>(data.clone()) {
        Ok(event) => sink.deliver(NotificationFormatter::order_assigned(&event, data, Utc::now())),
        Err(e) => warn!(event = ORDER_ASSIGNED_EVENT, error = %e, "Skipping malformed order event"),
    }
}

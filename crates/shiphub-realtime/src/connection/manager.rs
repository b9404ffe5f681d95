//! Connection manager: the one realtime connection and its listeners.
//!
//! The connection exists exactly while the session is authenticated.
//! [`ConnectionManager::sync_with`] is the only place that opens or closes
//! it; [`ConnectionManager::bind`] drives it from the session watch channel.

use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use shiphub_core::error::AppError;
use shiphub_core::result::AppResult;
use shiphub_entity::session::AuthState;

use crate::message::types::{InboundFrame, OutboundFrame};
use crate::message::validator::validate_event_name;

use super::registry::{EventHandlerRef, ListenerRegistry};
use super::state::ConnectionState;
use super::transport::{RealtimeTransport, TokenSource};

/// Unique connection identifier, fresh for every open.
pub type ConnectionId = Uuid;

/// The live link owned by the manager.
#[derive(Debug)]
struct ActiveLink {
    id: ConnectionId,
    outbound: mpsc::Sender<OutboundFrame>,
    pump: JoinHandle<()>,
}

/// State shared with the pump task.
#[derive(Debug)]
struct Shared {
    listeners: ListenerRegistry,
    state_tx: watch::Sender<ConnectionState>,
    active: Mutex<Option<ActiveLink>>,
}

impl Shared {
    /// Publishes `state` only if `conn_id` is still the active link.
    fn publish(&self, conn_id: ConnectionId, state: ConnectionState) {
        let active = self.active.lock();
        if active.as_ref().is_some_and(|link| link.id == conn_id) {
            self.state_tx.send_if_modified(|current| {
                let changed = *current != state;
                *current = state;
                changed
            });
        }
    }

    /// Clears the active slot if it still belongs to `conn_id`.
    fn release(&self, conn_id: ConnectionId) {
        let mut active = self.active.lock();
        if active.as_ref().is_some_and(|link| link.id == conn_id) {
            *active = None;
            self.state_tx.send_replace(ConnectionState::Disconnected);
        }
    }
}

/// Owns the single realtime connection.
#[derive(Debug)]
pub struct ConnectionManager {
    transport: Arc<dyn RealtimeTransport>,
    token_tx: watch::Sender<Option<String>>,
    shared: Arc<Shared>,
}

impl ConnectionManager {
    /// Creates a disconnected manager.
    pub fn new(transport: Arc<dyn RealtimeTransport>) -> Self {
        let (state_tx, _) = watch::channel(ConnectionState::Disconnected);
        let (token_tx, _) = watch::channel(None);
        Self {
            transport,
            token_tx,
            shared: Arc::new(Shared {
                listeners: ListenerRegistry::new(),
                state_tx,
                active: Mutex::new(None),
            }),
        }
    }

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        *self.shared.state_tx.borrow()
    }

    /// Subscribes to connection state changes.
    pub fn subscribe_state(&self) -> watch::Receiver<ConnectionState> {
        self.shared.state_tx.subscribe()
    }

    /// Whether a link is currently held (connected or still dialing).
    pub fn is_open(&self) -> bool {
        self.shared.active.lock().is_some()
    }

    /// Listener registry, shared by every consumer.
    pub fn listeners(&self) -> &ListenerRegistry {
        &self.shared.listeners
    }

    /// Registers `handler` for `event`. Idempotent per handler identity.
    pub fn subscribe(&self, event: &str, handler: EventHandlerRef) -> bool {
        let added = self.shared.listeners.add(event, handler);
        if added {
            debug!(event = %event, "Listener registered");
        }
        added
    }

    /// Removes `handler` from `event`. Unknown handlers are ignored.
    pub fn unsubscribe(&self, event: &str, handler: &EventHandlerRef) -> bool {
        let removed = self.shared.listeners.remove(event, handler);
        if removed {
            debug!(event = %event, "Listener removed");
        }
        removed
    }

    /// Sends an event if connected. Best effort: returns `false` and drops
    /// the frame when disconnected or when the send buffer is full.
    pub fn emit(&self, event: &str, data: Value) -> bool {
        if !self.state().is_connected() {
            debug!(event = %event, "Emit while disconnected; dropped");
            return false;
        }

        let active = self.shared.active.lock();
        let Some(link) = active.as_ref() else {
            return false;
        };

        match link.outbound.try_send(OutboundFrame::new(event, data)) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!(conn_id = %link.id, event = %event, "Send buffer full, dropping frame");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                debug!(conn_id = %link.id, event = %event, "Link closed, dropping frame");
                false
            }
        }
    }

    /// Brings the connection in line with the session: open while
    /// authenticated, closed otherwise. Also hands the latest token to the
    /// transport for its next handshake.
    pub fn sync_with(&self, session: &AuthState) {
        let token = session.active_token().map(str::to_string);
        self.token_tx.send_if_modified(|current| {
            if *current == token {
                false
            } else {
                current.clone_from(&token);
                true
            }
        });

        if token.is_some() {
            if let Err(e) = self.open() {
                warn!(error = %e, "Failed to open realtime connection");
            }
        } else {
            self.close();
        }
    }

    /// Spawns the observer that keeps the connection in sync with the
    /// session. The current state is applied before this returns.
    pub fn bind(self: &Arc<Self>, mut session: watch::Receiver<AuthState>) -> JoinHandle<()> {
        self.sync_with(&session.borrow_and_update());

        let manager = Arc::clone(self);
        tokio::spawn(async move {
            while session.changed().await.is_ok() {
                let state = session.borrow_and_update().clone();
                manager.sync_with(&state);
            }
            debug!("Session channel closed; closing realtime connection");
            manager.close();
        })
    }

    /// Opens a link unless one is already held. Returns whether a new link
    /// was opened.
    fn open(&self) -> AppResult<bool> {
        let mut active = self.shared.active.lock();
        if let Some(link) = active.as_ref() {
            debug!(conn_id = %link.id, "Realtime connection already open");
            return Ok(false);
        }

        if self.token_tx.borrow().is_none() {
            return Err(AppError::authentication(
                "Cannot open a realtime connection without a session token",
            ));
        }

        let link = self
            .transport
            .connect(TokenSource::new(self.token_tx.subscribe()))?;
        let id = Uuid::new_v4();

        self.shared.state_tx.send_replace(ConnectionState::Connecting);
        let pump = tokio::spawn(pump(
            id,
            link.inbound,
            link.status,
            Arc::clone(&self.shared),
        ));

        *active = Some(ActiveLink {
            id,
            outbound: link.outbound,
            pump,
        });

        info!(
            conn_id = %id,
            transport = %self.transport.name(),
            "Realtime connection opened"
        );
        Ok(true)
    }

    /// Closes the link, discarding queued outbound frames. Safe to call when
    /// already closed. Returns whether a link was closed.
    pub fn close(&self) -> bool {
        let Some(link) = self.shared.active.lock().take() else {
            self.shared.state_tx.send_if_modified(|state| {
                let changed = *state != ConnectionState::Disconnected;
                *state = ConnectionState::Disconnected;
                changed
            });
            return false;
        };

        link.pump.abort();
        self.shared.state_tx.send_replace(ConnectionState::Disconnected);
        info!(conn_id = %link.id, "Realtime connection closed");
        true
    }
}

impl Drop for ConnectionManager {
    fn drop(&mut self) {
        if let Some(link) = self.shared.active.lock().take() {
            link.pump.abort();
        }
    }
}

/// Forwards link status into the manager state and dispatches inbound
/// frames to listeners until the transport ends the link.
async fn pump(
    conn_id: ConnectionId,
    mut inbound: mpsc::Receiver<InboundFrame>,
    mut status: watch::Receiver<ConnectionState>,
    shared: Arc<Shared>,
) {
    let initial = *status.borrow_and_update();
    shared.publish(conn_id, initial);

    loop {
        tokio::select! {
            changed = status.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = *status.borrow_and_update();
                debug!(conn_id = %conn_id, state = %state, "Link status changed");
                shared.publish(conn_id, state);
            }
            frame = inbound.recv() => {
                let Some(frame) = frame else {
                    break;
                };
                if let Err(e) = validate_event_name(&frame.event) {
                    warn!(conn_id = %conn_id, error = %e, "Dropping inbound frame");
                    continue;
                }
                let delivered = shared.listeners.dispatch(&frame.event, &frame.data);
                debug!(
                    conn_id = %conn_id,
                    event = %frame.event,
                    listeners = delivered,
                    "Inbound event dispatched"
                );
            }
        }
    }

    info!(conn_id = %conn_id, "Realtime transport ended the link");
    shared.release(conn_id);
}

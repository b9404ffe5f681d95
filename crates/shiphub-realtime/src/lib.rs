//! # shiphub-realtime
//!
//! Realtime side of the ShipHub client. Provides:
//!
//! - A single realtime connection whose lifetime follows the session
//! - A listener registry with idempotent subscribe/unsubscribe
//! - A WebSocket transport with transport-owned reconnects
//! - The in-memory notification feed with unread accounting
//! - The coordinator translating order events into notifications

pub mod client;
pub mod connection;
pub mod message;
pub mod notification;

pub use client::RealtimeClient;
pub use connection::manager::ConnectionManager;
pub use connection::registry::{EventHandler, EventHandlerRef, HandlerSet, ListenerRegistry};
pub use connection::state::ConnectionState;
pub use connection::transport::{RealtimeTransport, TokenSource, TransportLink};
pub use connection::ws::WsTransport;
pub use notification::coordinator::NotificationCoordinator;
pub use notification::platform::{LogPlatform, NotificationPlatform, PermissionState};
pub use notification::store::NotificationStore;

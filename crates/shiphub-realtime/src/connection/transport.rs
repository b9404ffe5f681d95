//! Transport seam between the connection manager and the wire.

use std::fmt::Debug;

use tokio::sync::{mpsc, watch};

use shiphub_core::result::AppResult;

use crate::message::types::{InboundFrame, OutboundFrame};

use super::state::ConnectionState;

/// Yields the latest session token.
///
/// Transports read it on every (re)connect, so a rotated token is used by
/// the next handshake.
#[derive(Debug, Clone)]
pub struct TokenSource(watch::Receiver<Option<String>>);

impl TokenSource {
    /// Wraps a token receiver.
    pub fn new(rx: watch::Receiver<Option<String>>) -> Self {
        Self(rx)
    }

    /// The token right now, if a session is active.
    pub fn current(&self) -> Option<String> {
        self.0.borrow().clone()
    }
}

/// One logical link handed out by a transport.
///
/// The transport keeps the link alive (reconnecting as it sees fit) until
/// the holder drops `inbound`.
#[derive(Debug)]
pub struct TransportLink {
    /// Frames to send.
    pub outbound: mpsc::Sender<OutboundFrame>,
    /// Frames received.
    pub inbound: mpsc::Receiver<InboundFrame>,
    /// Link state as observed by the transport.
    pub status: watch::Receiver<ConnectionState>,
}

/// Opens realtime links.
pub trait RealtimeTransport: Send + Sync + Debug + 'static {
    /// Transport name for logs.
    fn name(&self) -> &str;

    /// Starts a link. Returns immediately; progress is reported on
    /// [`TransportLink::status`]. Must be called within a Tokio runtime.
    fn connect(&self, token: TokenSource) -> AppResult<TransportLink>;
}

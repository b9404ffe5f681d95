//! Connection lifecycle state.

use std::fmt;

use serde::Serialize;

/// State of the single realtime connection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    /// No link, or the transport gave up.
    #[default]
    Disconnected,
    /// Handshake (or a transport reconnect) in progress.
    Connecting,
    /// Link established; events flow.
    Connected,
}

impl ConnectionState {
    /// Whether events can be sent and received.
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }

    /// Lowercase name for logs and CLI output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

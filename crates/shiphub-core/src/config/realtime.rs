//! Realtime transport configuration.

use serde::{Deserialize, Serialize};

/// Realtime (WebSocket) client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// WebSocket endpoint of the realtime server.
    #[serde(default = "default_url")]
    pub url: String,
    /// Query parameter carrying the bearer token during the handshake.
    #[serde(default = "default_token_param")]
    pub token_query_param: String,
    /// Buffer size of the inbound/outbound frame channels.
    #[serde(default = "default_channel_buffer")]
    pub channel_buffer_size: usize,
    /// Handshake timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u64,
    /// Transport-owned reconnect policy.
    #[serde(default)]
    pub reconnect: ReconnectConfig,
    /// Notification feed settings.
    #[serde(default)]
    pub notifications: NotificationFeedConfig,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            token_query_param: default_token_param(),
            channel_buffer_size: default_channel_buffer(),
            connect_timeout_seconds: default_connect_timeout(),
            reconnect: ReconnectConfig::default(),
            notifications: NotificationFeedConfig::default(),
        }
    }
}

/// Reconnect settings applied by the transport after an established link drops.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconnectConfig {
    /// Whether the transport re-dials after losing the link.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Fixed delay between attempts in milliseconds.
    #[serde(default = "default_delay")]
    pub delay_ms: u64,
    /// Maximum consecutive attempts before giving up.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            delay_ms: default_delay(),
            max_attempts: default_max_attempts(),
        }
    }
}

/// In-memory notification feed settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationFeedConfig {
    /// Maximum feed length; `0` keeps the feed unbounded.
    #[serde(default)]
    pub max_feed_len: usize,
    /// Initial platform notification permission: `"default"`, `"granted"` or `"denied"`.
    #[serde(default = "default_permission")]
    pub platform_permission: String,
}

impl Default for NotificationFeedConfig {
    fn default() -> Self {
        Self {
            max_feed_len: 0,
            platform_permission: default_permission(),
        }
    }
}

fn default_url() -> String {
    "ws://localhost:3000/ws".to_string()
}

fn default_token_param() -> String {
    "token".to_string()
}

fn default_channel_buffer() -> usize {
    256
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_true() -> bool {
    true
}

fn default_delay() -> u64 {
    2000
}

fn default_max_attempts() -> u32 {
    5
}

fn default_permission() -> String {
    "default".to_string()
}

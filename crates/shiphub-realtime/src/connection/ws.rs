//! WebSocket transport (tokio-tungstenite).
//!
//! Each link runs in its own task: dial with the current token, pump frames
//! both ways, and on a dropped socket re-dial after a fixed delay up to the
//! configured attempt limit. The task ends as soon as the link holder drops
//! its inbound receiver.

use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, info, warn};

use shiphub_core::config::RealtimeConfig;
use shiphub_core::error::{AppError, ErrorKind};
use shiphub_core::result::AppResult;

use crate::message::types::{InboundFrame, OutboundFrame};
use crate::message::validator::parse_inbound;

use super::state::ConnectionState;
use super::transport::{RealtimeTransport, TokenSource, TransportLink};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// How a connected session of the pump ended.
enum LinkEnd {
    /// The holder released the link; stop for good.
    Released,
    /// The socket failed or the server closed it; may re-dial.
    Dropped,
}

/// WebSocket realtime transport.
#[derive(Debug, Clone)]
pub struct WsTransport {
    config: RealtimeConfig,
}

impl WsTransport {
    /// Creates a transport from configuration.
    pub fn new(config: RealtimeConfig) -> Self {
        Self { config }
    }

    /// Handshake URL carrying the token as a query parameter.
    pub fn endpoint(&self, token: &str) -> String {
        endpoint(&self.config, token)
    }
}

impl RealtimeTransport for WsTransport {
    fn name(&self) -> &str {
        "websocket"
    }

    fn connect(&self, token: TokenSource) -> AppResult<TransportLink> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|e| {
            AppError::with_source(
                ErrorKind::Internal,
                "WebSocket transport requires a Tokio runtime",
                e,
            )
        })?;

        let buffer = self.config.channel_buffer_size.max(1);
        let (outbound_tx, outbound_rx) = mpsc::channel(buffer);
        let (inbound_tx, inbound_rx) = mpsc::channel(buffer);
        let (status_tx, status_rx) = watch::channel(ConnectionState::Connecting);

        runtime.spawn(run_link(
            self.config.clone(),
            token,
            outbound_rx,
            inbound_tx,
            status_tx,
        ));

        Ok(TransportLink {
            outbound: outbound_tx,
            inbound: inbound_rx,
            status: status_rx,
        })
    }
}

fn endpoint(config: &RealtimeConfig, token: &str) -> String {
    let separator = if config.url.contains('?') { '&' } else { '?' };
    format!(
        "{}{}{}={}",
        config.url, separator, config.token_query_param, token
    )
}

async fn run_link(
    config: RealtimeConfig,
    token: TokenSource,
    mut outbound: mpsc::Receiver<OutboundFrame>,
    inbound: mpsc::Sender<InboundFrame>,
    status: watch::Sender<ConnectionState>,
) {
    let connect_timeout = Duration::from_secs(config.connect_timeout_seconds);
    let delay = Duration::from_millis(config.reconnect.delay_ms);
    let mut attempt: u32 = 0;

    loop {
        let Some(current) = token.current() else {
            debug!("No session token; realtime link closing");
            break;
        };

        status.send_replace(ConnectionState::Connecting);
        let url = endpoint(&config, &current);

        let dialed = tokio::select! {
            _ = inbound.closed() => {
                debug!("Realtime link released while dialing");
                break;
            }
            dialed = tokio::time::timeout(connect_timeout, connect_async(url.as_str())) => dialed,
        };

        match dialed {
            Ok(Ok((socket, _response))) => {
                info!(url = %config.url, "Realtime socket connected");
                attempt = 0;
                status.send_replace(ConnectionState::Connected);
                if let LinkEnd::Released = pump(socket, &mut outbound, &inbound).await {
                    debug!("Realtime link released");
                    break;
                }
                warn!("Realtime socket dropped");
            }
            Ok(Err(e)) => warn!(error = %e, attempt, "Realtime connect failed"),
            Err(_) => warn!(
                timeout_secs = config.connect_timeout_seconds,
                attempt, "Realtime connect timed out"
            ),
        }

        status.send_replace(ConnectionState::Disconnected);

        if !config.reconnect.enabled || attempt >= config.reconnect.max_attempts {
            warn!(attempts = attempt, "Realtime transport giving up");
            break;
        }
        attempt += 1;

        tokio::select! {
            _ = inbound.closed() => break,
            _ = tokio::time::sleep(delay) => {}
        }
    }

    status.send_replace(ConnectionState::Disconnected);
}

async fn pump(
    socket: Socket,
    outbound: &mut mpsc::Receiver<OutboundFrame>,
    inbound: &mpsc::Sender<InboundFrame>,
) -> LinkEnd {
    let (mut sink, mut source) = socket.split();

    loop {
        tokio::select! {
            biased;
            _ = inbound.closed() => {
                let _ = sink.close().await;
                return LinkEnd::Released;
            }
            frame = outbound.recv() => {
                let Some(frame) = frame else {
                    let _ = sink.close().await;
                    return LinkEnd::Released;
                };
                let text = match serde_json::to_string(&frame) {
                    Ok(text) => text,
                    Err(e) => {
                        warn!(event = %frame.event, error = %e, "Failed to encode outbound frame");
                        continue;
                    }
                };
                if let Err(e) = sink.send(Message::text(text)).await {
                    warn!(event = %frame.event, error = %e, "Failed to send frame");
                    return LinkEnd::Dropped;
                }
            }
            message = source.next() => match message {
                Some(Ok(Message::Text(text))) => match parse_inbound(text.as_str()) {
                    Ok(frame) => {
                        if inbound.send(frame).await.is_err() {
                            let _ = sink.close().await;
                            return LinkEnd::Released;
                        }
                    }
                    Err(e) => warn!(error = %e, "Dropping inbound frame"),
                },
                Some(Ok(Message::Close(reason))) => {
                    debug!(reason = ?reason, "Server closed realtime socket");
                    return LinkEnd::Dropped;
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    warn!(error = %e, "Realtime socket error");
                    return LinkEnd::Dropped;
                }
                None => return LinkEnd::Dropped,
            },
        }
    }
}

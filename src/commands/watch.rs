//! `watch`: follow realtime notifications for the stored session.

use std::sync::Arc;

use clap::Args;
use serde::Serialize;
use tabled::Tabled;
use tokio::sync::broadcast::error::RecvError;
use tracing::debug;

use shiphub_auth::SessionStore;
use shiphub_core::config::AppConfig;
use shiphub_core::error::AppError;
use shiphub_core::result::AppResult;
use shiphub_entity::notification::Notification;
use shiphub_realtime::RealtimeClient;

use crate::output::{self, OutputFormat};

/// Arguments for `watch`
#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Stop after this many notifications
    #[arg(short, long)]
    pub limit: Option<usize>,
}

/// Notification display row
#[derive(Debug, Serialize, Tabled)]
struct NotificationRow {
    /// Notification ID
    id: String,
    /// Type
    kind: String,
    /// Title
    title: String,
    /// Message
    message: String,
    /// Read
    read: String,
    /// Created
    created: String,
}

impl From<&Notification> for NotificationRow {
    fn from(n: &Notification) -> Self {
        Self {
            id: n.id.clone(),
            kind: n.kind.to_string(),
            title: n.title.clone(),
            message: n.message.clone(),
            read: if n.is_read { "✓" } else { "✗" }.to_string(),
            created: n.created_at.format("%H:%M:%S").to_string(),
        }
    }
}

/// Execute `watch`
pub async fn execute(
    args: &WatchArgs,
    config: &AppConfig,
    session: &Arc<SessionStore>,
    format: OutputFormat,
) -> AppResult<()> {
    let state = session.check_auth().await;
    if !state.is_authenticated {
        return Err(AppError::authentication(
            "Not signed in. Run `shiphub login` first.",
        ));
    }

    let client = RealtimeClient::from_config(&config.realtime);
    let mut added = client.store().subscribe();
    let mut connection = client.connection().subscribe_state();
    client.start(session.subscribe());

    output::print_success("Watching for notifications (Ctrl-C to stop)");

    let mut received = 0usize;
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = connection.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = *connection.borrow_and_update();
                output::print_warning(&format!("Connection {state}"));
            }
            notification = added.recv() => match notification {
                Ok(n) => {
                    received += 1;
                    println!(
                        "[{}] {}: {} (unread: {})",
                        n.kind,
                        n.title,
                        n.message,
                        client.store().unread_count()
                    );
                    if args.limit.is_some_and(|limit| received >= limit) {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    debug!(skipped, "Notification display lagged");
                }
                Err(RecvError::Closed) => break,
            },
        }
    }

    client.shutdown().await?;

    let rows: Vec<NotificationRow> = client
        .store()
        .snapshot()
        .iter()
        .map(NotificationRow::from)
        .collect();
    output::print_list(&rows, format);
    Ok(())
}

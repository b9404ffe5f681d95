//! Top-level realtime client that ties the subsystems together.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use shiphub_core::config::RealtimeConfig;
use shiphub_core::result::AppResult;
use shiphub_entity::session::AuthState;

use crate::connection::manager::ConnectionManager;
use crate::connection::transport::RealtimeTransport;
use crate::connection::ws::WsTransport;
use crate::notification::coordinator::NotificationCoordinator;
use crate::notification::platform::{LogPlatform, NotificationPlatform};
use crate::notification::store::NotificationStore;

#[derive(Debug, Default)]
struct Tasks {
    session_observer: Option<JoinHandle<()>>,
    coordinator: Option<JoinHandle<()>>,
}

/// Owns the connection manager, the notification feed and the coordinator.
///
/// Construct once per process, call [`RealtimeClient::start`] with the
/// session receiver and [`RealtimeClient::shutdown`] on exit.
#[derive(Debug)]
pub struct RealtimeClient {
    /// Connection manager.
    connection: Arc<ConnectionManager>,
    /// Notification feed.
    store: Arc<NotificationStore>,
    /// Coordinator feeding the store.
    coordinator: Arc<NotificationCoordinator>,
    /// Shutdown signal sender.
    shutdown_tx: broadcast::Sender<()>,
    tasks: Mutex<Tasks>,
}

impl RealtimeClient {
    /// Creates a client from its collaborators.
    pub fn new(
        config: &RealtimeConfig,
        transport: Arc<dyn RealtimeTransport>,
        platform: Arc<dyn NotificationPlatform>,
    ) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);

        let connection = Arc::new(ConnectionManager::new(transport));
        let store = Arc::new(NotificationStore::from_config(&config.notifications));
        let coordinator = Arc::new(NotificationCoordinator::new(
            connection.clone(),
            store.clone(),
            platform,
        ));

        info!(
            max_feed_len = config.notifications.max_feed_len,
            "Realtime client initialized"
        );

        Self {
            connection,
            store,
            coordinator,
            shutdown_tx,
            tasks: Mutex::new(Tasks::default()),
        }
    }

    /// Creates a client with the WebSocket transport and the log platform.
    pub fn from_config(config: &RealtimeConfig) -> Self {
        Self::new(
            config,
            Arc::new(WsTransport::new(config.clone())),
            Arc::new(LogPlatform::from_setting(
                &config.notifications.platform_permission,
            )),
        )
    }

    /// Connection manager.
    pub fn connection(&self) -> &Arc<ConnectionManager> {
        &self.connection
    }

    /// Notification feed.
    pub fn store(&self) -> &Arc<NotificationStore> {
        &self.store
    }

    /// Notification coordinator.
    pub fn coordinator(&self) -> &Arc<NotificationCoordinator> {
        &self.coordinator
    }

    /// Starts following the session. A second call is ignored.
    pub fn start(&self, session: watch::Receiver<AuthState>) {
        let mut tasks = self.tasks.lock();
        if tasks.session_observer.is_some() {
            warn!("Realtime client already started");
            return;
        }

        let coordinator = self.coordinator.clone();
        let state = self.connection.subscribe_state();
        let shutdown = self.shutdown_tx.subscribe();
        tasks.coordinator = Some(tokio::spawn(async move {
            coordinator.run(state, shutdown).await;
        }));
        tasks.session_observer = Some(self.connection.bind(session));

        info!("Realtime client started");
    }

    /// Stops following the session, detaches the coordinator and closes the
    /// connection.
    pub async fn shutdown(&self) -> AppResult<()> {
        info!("Shutting down realtime client");

        let tasks = std::mem::take(&mut *self.tasks.lock());
        if let Some(observer) = tasks.session_observer {
            observer.abort();
        }

        // No receivers means nothing was started.
        let _ = self.shutdown_tx.send(());

        if let Some(coordinator) = tasks.coordinator {
            if let Err(e) = coordinator.await {
                warn!(error = %e, "Coordinator task ended abnormally");
            }
        }
        self.coordinator.deactivate();
        self.connection.close();

        info!("Realtime client shut down");
        Ok(())
    }
}

//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::{Notify, mpsc, watch};

use shiphub_auth::{AuthApi, AuthFailure, LoginRequest, SessionStore, SignInResponse};
use shiphub_core::result::AppResult;
use shiphub_core::traits::storage::{DurableStorage, read_json, write_json};
use shiphub_entity::session::{AuthState, StoredCredentials};
use shiphub_entity::user::{User, UserRole};
use shiphub_realtime::message::{InboundFrame, OutboundFrame};
use shiphub_realtime::{ConnectionState, RealtimeTransport, TokenSource, TransportLink};
use shiphub_storage::keys;
use shiphub_storage::memory::MemoryStorage;

/// A user with the given role.
pub fn user(role: UserRole) -> User {
    let slug = role.as_str().to_lowercase();
    User {
        id: format!("{slug}-1"),
        email: format!("{slug}@ship.test"),
        name: Some(format!("Test {slug}")),
        role,
        phone: None,
    }
}

/// A successful sign-in for `role` with `token`.
pub fn accepted(role: UserRole, token: &str) -> Result<SignInResponse, AuthFailure> {
    Ok(SignInResponse {
        access_token: token.to_string(),
        user: user(role),
    })
}

/// The server refusing the credentials with a message.
pub fn rejected(message: &str) -> Result<SignInResponse, AuthFailure> {
    Err(AuthFailure::Rejected {
        status: 401,
        message: Some(message.to_string()),
    })
}

/// Auth collaborator answering from a script.
#[derive(Debug)]
pub struct ScriptedAuthApi {
    storage: Arc<dyn DurableStorage>,
    answer: Mutex<Result<SignInResponse, AuthFailure>>,
    /// When set, `sign_in` waits for a notification before answering.
    gate: Option<Arc<Notify>>,
    /// Whether `sign_out` reports a failure.
    fail_sign_out: bool,
    sign_in_calls: AtomicUsize,
}

impl ScriptedAuthApi {
    pub fn new(storage: Arc<dyn DurableStorage>, answer: Result<SignInResponse, AuthFailure>) -> Self {
        Self {
            storage,
            answer: Mutex::new(answer),
            gate: None,
            fail_sign_out: false,
            sign_in_calls: AtomicUsize::new(0),
        }
    }

    pub fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn failing_sign_out(mut self) -> Self {
        self.fail_sign_out = true;
        self
    }

    pub fn set_answer(&self, answer: Result<SignInResponse, AuthFailure>) {
        *self.answer.lock() = answer;
    }

    pub fn sign_in_calls(&self) -> usize {
        self.sign_in_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AuthApi for ScriptedAuthApi {
    async fn sign_in(&self, _request: &LoginRequest) -> Result<SignInResponse, AuthFailure> {
        self.sign_in_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.answer.lock().clone()
    }

    async fn sign_out(&self) -> AppResult<()> {
        if self.fail_sign_out {
            return Err(shiphub_core::AppError::external_service("sign-out unavailable"));
        }
        self.storage.delete(keys::CREDENTIALS).await
    }

    async fn get_token(&self) -> AppResult<Option<StoredCredentials>> {
        read_json(self.storage.as_ref(), keys::CREDENTIALS).await
    }

    async fn set_token(&self, token: &str, role: UserRole) -> AppResult<()> {
        write_json(
            self.storage.as_ref(),
            keys::CREDENTIALS,
            &StoredCredentials::new(token, role),
        )
        .await
    }
}

/// One recorded durable write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedWrite {
    pub key: String,
    /// Whether the session was already authenticated when the write landed.
    pub authenticated_at_write: bool,
}

/// In-memory storage that records every write together with the session's
/// authenticated flag at that moment.
#[derive(Debug, Default)]
pub struct RecordingStorage {
    inner: MemoryStorage,
    session: Mutex<Option<watch::Receiver<AuthState>>>,
    writes: Mutex<Vec<RecordedWrite>>,
}

impl RecordingStorage {
    pub fn observe(&self, session: watch::Receiver<AuthState>) {
        *self.session.lock() = Some(session);
    }

    pub fn writes(&self) -> Vec<RecordedWrite> {
        self.writes.lock().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

#[async_trait]
impl DurableStorage for RecordingStorage {
    fn provider_type(&self) -> &str {
        "recording"
    }

    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> AppResult<()> {
        self.inner.set(key, value).await?;
        let authenticated_at_write = self
            .session
            .lock()
            .as_ref()
            .is_some_and(|rx| rx.borrow().is_authenticated);
        self.writes.lock().push(RecordedWrite {
            key: key.to_string(),
            authenticated_at_write,
        });
        Ok(())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.inner.delete(key).await
    }
}

/// Session store over recording storage and a scripted collaborator.
pub struct SessionFixture {
    pub session: Arc<SessionStore>,
    pub storage: Arc<RecordingStorage>,
    pub api: Arc<ScriptedAuthApi>,
}

impl SessionFixture {
    pub fn new(answer: Result<SignInResponse, AuthFailure>) -> Self {
        Self::with_api(|storage| ScriptedAuthApi::new(storage, answer))
    }

    pub fn with_api(build: impl FnOnce(Arc<dyn DurableStorage>) -> ScriptedAuthApi) -> Self {
        let storage = Arc::new(RecordingStorage::default());
        let shared: Arc<dyn DurableStorage> = storage.clone();
        let api = Arc::new(build(shared));
        let session = Arc::new(SessionStore::new(api.clone(), storage.clone()));
        storage.observe(session.subscribe());
        Self {
            session,
            storage,
            api,
        }
    }
}

/// Transport handing out in-process links.
#[derive(Debug, Default)]
pub struct LoopbackTransport {
    links: Mutex<Vec<LoopbackLink>>,
}

#[derive(Debug)]
struct LoopbackLink {
    token: TokenSource,
    inbound: mpsc::Sender<InboundFrame>,
    _status: watch::Sender<ConnectionState>,
    _outbound: mpsc::Receiver<OutboundFrame>,
}

impl RealtimeTransport for LoopbackTransport {
    fn name(&self) -> &str {
        "loopback"
    }

    fn connect(&self, token: TokenSource) -> AppResult<TransportLink> {
        let (outbound_tx, outbound_rx) = mpsc::channel(16);
        let (inbound_tx, inbound_rx) = mpsc::channel(16);
        let (status_tx, status_rx) = watch::channel(ConnectionState::Connected);
        self.links.lock().push(LoopbackLink {
            token,
            inbound: inbound_tx,
            _status: status_tx,
            _outbound: outbound_rx,
        });
        Ok(TransportLink {
            outbound: outbound_tx,
            inbound: inbound_rx,
            status: status_rx,
        })
    }
}

impl LoopbackTransport {
    /// Links ever opened.
    pub fn opened(&self) -> usize {
        self.links.lock().len()
    }

    /// Links whose holder has not released them.
    pub fn live_links(&self) -> usize {
        self.links
            .lock()
            .iter()
            .filter(|link| !link.inbound.is_closed())
            .count()
    }

    /// Token the newest link would use for its next handshake.
    pub fn current_token(&self) -> Option<String> {
        self.links.lock().last().and_then(|link| link.token.current())
    }

    /// Pushes a frame into the newest live link.
    pub async fn inject(&self, frame: InboundFrame) {
        let inbound = self
            .links
            .lock()
            .iter()
            .rev()
            .find(|link| !link.inbound.is_closed())
            .map(|link| link.inbound.clone())
            .expect("no live link");
        inbound.send(frame).await.expect("link released");
    }
}

/// Polls `condition` until it holds or a second passes.
pub async fn eventually(what: &str, mut condition: impl FnMut() -> bool) {
    for _ in 0..100 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("timed out waiting for: {what}");
}

//! Test helpers
//!
//! [`MockTransport`] is a scripted in-memory transport: dial outcomes are
//! programmable, every accepted emit is captured, and inbound events are
//! injected through the same stream a real transport would use.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio::sync::mpsc;

use sync_client::{
    AuthCredential, StaticCredentials, SyncClient, SyncConfig, Transport, TransportError,
    TransportEvent, TransportResult,
};
use sync_core::DisconnectReason;

/// How the scripted server answers the handshake
#[derive(Debug, Clone)]
pub enum AuthMode {
    /// Queue an `authenticated` event as soon as the dial succeeds
    Accept,
    /// Queue an `auth:error` event as soon as the dial succeeds
    Reject { message: String },
    /// Queue nothing; the test drives the handshake by hand
    Manual,
}

/// Scripted in-memory transport
pub struct MockTransport {
    connected: AtomicBool,
    auth_mode: Mutex<AuthMode>,
    dial_failures: AtomicU32,
    fail_sends: AtomicBool,
    emitted: Mutex<Vec<(String, Value)>>,
    events_tx: Mutex<Option<mpsc::UnboundedSender<TransportEvent>>>,
}

impl MockTransport {
    /// A transport whose server accepts every credential
    pub fn new() -> Arc<Self> {
        Self::with_auth_mode(AuthMode::Accept)
    }

    /// A transport whose server rejects the handshake
    pub fn rejecting(message: impl Into<String>) -> Arc<Self> {
        Self::with_auth_mode(AuthMode::Reject {
            message: message.into(),
        })
    }

    /// A transport with an explicit handshake script
    pub fn with_auth_mode(auth_mode: AuthMode) -> Arc<Self> {
        Arc::new(Self {
            connected: AtomicBool::new(false),
            auth_mode: Mutex::new(auth_mode),
            dial_failures: AtomicU32::new(0),
            fail_sends: AtomicBool::new(false),
            emitted: Mutex::new(Vec::new()),
            events_tx: Mutex::new(None),
        })
    }

    /// Make the next `count` dial attempts fail
    pub fn fail_next_dials(&self, count: u32) {
        self.dial_failures.store(count, Ordering::SeqCst);
    }

    /// Make every emit fail (or succeed again)
    pub fn set_send_failures(&self, fail: bool) {
        self.fail_sends.store(fail, Ordering::SeqCst);
    }

    /// Inject an inbound named event, as the server would send it
    pub fn inject(&self, name: &str, payload: Value) {
        self.push(TransportEvent::Event {
            name: name.to_string(),
            payload,
        });
    }

    /// Drop the channel from the transport side
    pub fn force_disconnect(&self, reason: DisconnectReason) {
        self.connected.store(false, Ordering::SeqCst);
        self.push(TransportEvent::Disconnected(reason));
    }

    /// Simulate a transport-internal reconnect followed by a fresh auth ack
    pub fn reconnect_and_authenticate(&self) {
        self.connected.store(true, Ordering::SeqCst);
        self.push(TransportEvent::Connected);
        self.inject("authenticated", json!({}));
    }

    /// Snapshot of every accepted emit, in order
    pub fn emitted(&self) -> Vec<(String, Value)> {
        self.emitted.lock().clone()
    }

    /// Payloads of accepted emits with the given event name, in order
    pub fn emitted_named(&self, name: &str) -> Vec<Value> {
        self.emitted
            .lock()
            .iter()
            .filter(|(event, _)| event == name)
            .map(|(_, payload)| payload.clone())
            .collect()
    }

    /// Forget previously captured emits
    pub fn clear_emitted(&self) {
        self.emitted.lock().clear();
    }

    fn push(&self, event: TransportEvent) {
        if let Some(tx) = self.events_tx.lock().as_ref() {
            tx.send(event).ok();
        }
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn connect(
        &self,
        _credential: &AuthCredential,
    ) -> TransportResult<mpsc::UnboundedReceiver<TransportEvent>> {
        let remaining = self.dial_failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.dial_failures.store(remaining - 1, Ordering::SeqCst);
            return Err(TransportError::Connect("dial refused".to_string()));
        }

        let (tx, rx) = mpsc::unbounded_channel();
        *self.events_tx.lock() = Some(tx);
        self.connected.store(true, Ordering::SeqCst);

        match self.auth_mode.lock().clone() {
            AuthMode::Accept => self.inject("authenticated", json!({})),
            AuthMode::Reject { message } => self.inject("auth:error", json!({ "message": message })),
            AuthMode::Manual => {}
        }

        Ok(rx)
    }

    async fn emit(&self, name: &str, payload: Value) -> TransportResult<()> {
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(TransportError::Send("send refused".to_string()));
        }
        if !self.connected.load(Ordering::SeqCst) {
            return Err(TransportError::Closed);
        }

        self.emitted.lock().push((name.to_string(), payload));
        Ok(())
    }

    async fn disconnect(&self) {
        self.connected.store(false, Ordering::SeqCst);
        self.push(TransportEvent::Disconnected(
            DisconnectReason::ClientInitiated,
        ));
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}

/// Build a client over the given transport with a static test token
pub fn build_client(transport: Arc<MockTransport>, config: SyncConfig) -> SyncClient {
    SyncClient::new(
        transport,
        Arc::new(StaticCredentials::new("test-token")),
        config,
    )
}

/// Poll a condition, yielding to background tasks between checks
///
/// Works under both real and paused tokio time (paused time auto-advances
/// while every task is idle).
pub async fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
    for _ in 0..400 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    condition()
}

//! The synchronization client
//!
//! `SyncClient` is the public surface; `ClientInner` is the shared state the
//! background tasks (inbound reader, queue flusher, typing expiry, heartbeat)
//! operate on. The state machine is the sole writer of the connection state,
//! the current conversation, and the outbound queue; inbound handling is the
//! sole writer of the presence cache.
//!
//! All outbound traffic funnels through [`ClientInner::emit`]: events are
//! appended to the queue and the flusher is woken whenever the channel is
//! authenticated. The flusher drains strictly front-to-back and stops the
//! moment the state changes or a send fails, so FIFO order and at-least-once
//! delivery hold across disconnect/reconnect cycles.

use parking_lot::Mutex;
use std::sync::{Arc, Weak};
use tokio::sync::{broadcast, mpsc, watch, Mutex as AsyncMutex, Notify};
use tokio::task::JoinHandle;

use sync_core::{
    ConnectionState, ConversationId, CorrelationId, DisconnectReason, InboundEvent, MessageId,
    MessageKind, OutboundEvent, PresenceEntry, Publication, SyncError, SyncResult, UserId,
};

use crate::auth::CredentialProvider;
use crate::bus::EventBus;
use crate::config::SyncConfig;
use crate::connection::backoff;
use crate::heartbeat::Heartbeat;
use crate::presence::PresenceCache;
use crate::queue::OutboundQueue;
use crate::transport::{Transport, TransportEvent};
use crate::typing::TypingDebouncer;

/// What pushed the machine into `Error`, kept for the in-flight `connect()`
enum LastError {
    Auth(String),
    Transport(String),
}

/// Realtime synchronization client
///
/// Cheap to clone; all clones share one connection. Construct a single
/// instance at the application's composition root and hand clones to
/// consumers; there is no hidden global.
#[derive(Clone)]
pub struct SyncClient {
    inner: Arc<ClientInner>,
}

pub(crate) struct ClientInner {
    /// Self-reference handed to the background tasks this machine starts
    weak_self: Weak<ClientInner>,
    config: SyncConfig,
    transport: Arc<dyn Transport>,
    credentials: Arc<dyn CredentialProvider>,
    bus: EventBus,
    queue: OutboundQueue,
    presence: PresenceCache,
    typing: Arc<TypingDebouncer>,
    heartbeat: Heartbeat,

    /// Sole writer of the connection state
    state_tx: watch::Sender<ConnectionState>,
    current_conversation: Mutex<Option<ConversationId>>,
    flush_notify: Arc<Notify>,
    connect_abort: Notify,
    last_error: Mutex<Option<LastError>>,

    /// Serializes concurrent `connect()` calls
    connect_gate: AsyncMutex<()>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl SyncClient {
    /// Create a client over the given transport and credential provider
    ///
    /// Must be called within a tokio runtime; the flusher and typing-expiry
    /// tasks are spawned here. No connection is opened until [`connect`].
    ///
    /// [`connect`]: SyncClient::connect
    #[must_use]
    pub fn new(
        transport: Arc<dyn Transport>,
        credentials: Arc<dyn CredentialProvider>,
        config: SyncConfig,
    ) -> Self {
        let (state_tx, _state_rx) = watch::channel(ConnectionState::Disconnected);
        let (typing, typing_expired) = TypingDebouncer::new(config.typing_ttl());
        let flush_notify = Arc::new(Notify::new());

        let inner = Arc::new_cyclic(|weak| ClientInner {
            weak_self: weak.clone(),
            heartbeat: Heartbeat::new(config.heartbeat_interval()),
            queue: OutboundQueue::new(config.queue_capacity),
            config,
            transport,
            credentials,
            bus: EventBus::default(),
            presence: PresenceCache::new(),
            typing,
            state_tx,
            current_conversation: Mutex::new(None),
            flush_notify: Arc::clone(&flush_notify),
            connect_abort: Notify::new(),
            last_error: Mutex::new(None),
            connect_gate: AsyncMutex::new(()),
            tasks: Mutex::new(Vec::new()),
        });

        let flusher = tokio::spawn(ClientInner::run_flusher(
            Arc::downgrade(&inner),
            flush_notify,
        ));
        let expiry = tokio::spawn(ClientInner::run_typing_expiry(
            Arc::downgrade(&inner),
            typing_expired,
        ));
        inner.tasks.lock().extend([flusher, expiry]);

        Self { inner }
    }

    /// Open the connection and resolve once the channel is authenticated
    ///
    /// A no-op when a live transport already reports connected (a second
    /// caller joins the in-flight handshake instead of redialing). Dials
    /// with capped exponential backoff up to the configured attempt budget;
    /// rejects on auth failure (no silent retry: supply a fresh credential
    /// and call again) or on budget exhaustion, both of which leave the
    /// machine in `Error` until the next `connect()`.
    pub async fn connect(&self) -> SyncResult<()> {
        let inner = &self.inner;
        let _gate = inner.connect_gate.lock().await;

        if inner.transport.is_connected() {
            if inner.state().is_authenticated() {
                tracing::debug!("connect() no-op: transport already connected");
                return Ok(());
            }
            // handshake already in flight; wait for its outcome
            return inner.await_authenticated().await;
        }

        let credential = inner.credentials.access_token().await?;

        let max_attempts = inner.config.reconnect.max_attempts.max(1);
        for attempt in 1..=max_attempts {
            inner.set_state(ConnectionState::Connecting);

            match inner.transport.connect(&credential).await {
                Ok(events) => {
                    inner.set_state(ConnectionState::Connected);

                    let reader = tokio::spawn(ClientInner::run_inbound(
                        Arc::downgrade(inner),
                        events,
                    ));
                    let mut tasks = inner.tasks.lock();
                    tasks.retain(|task| !task.is_finished());
                    tasks.push(reader);
                    drop(tasks);

                    return inner.await_authenticated().await;
                }
                Err(error) => {
                    if attempt == max_attempts {
                        tracing::warn!(attempt, max_attempts, error = %error, "Transport dial failed");
                        break;
                    }

                    let delay = backoff::delay_for_attempt(&inner.config.reconnect, attempt);
                    tracing::warn!(
                        attempt,
                        max_attempts,
                        error = %error,
                        delay_ms = delay.as_millis() as u64,
                        "Transport dial failed, backing off"
                    );

                    tokio::select! {
                        () = tokio::time::sleep(delay) => {}
                        () = inner.connect_abort.notified() => {
                            inner.set_state(ConnectionState::Disconnected);
                            return Err(SyncError::Cancelled);
                        }
                    }
                }
            }
        }

        tracing::error!(attempts = max_attempts, "Reconnection budget exhausted");
        inner.set_state(ConnectionState::Error);
        inner.bus.publish(Publication::ReconnectFailed {
            attempts: max_attempts,
        });
        Err(SyncError::ReconnectExhausted {
            attempts: max_attempts,
        })
    }

    /// Tear the connection down
    ///
    /// Cancels outstanding typing timers (emitting their stop signals),
    /// stops the heartbeat, clears the conversation bookkeeping, and aborts
    /// any in-flight backoff. The outbound queue is left intact so a
    /// subsequent `connect()` resumes pending work.
    pub async fn disconnect(&self) {
        let inner = &self.inner;
        inner.connect_abort.notify_waiters();

        for conversation_id in inner.typing.disarm_all() {
            inner.emit(OutboundEvent::Typing {
                conversation_id,
                is_typing: false,
            });
        }

        inner.heartbeat.stop();
        inner.current_conversation.lock().take();
        inner.set_state(ConnectionState::Disconnected);
        inner.transport.disconnect().await;

        tracing::info!(pending = inner.queue.len(), "Disconnected by request");
    }

    /// Send a message into a conversation
    ///
    /// Returns the correlation ID the server echoes in its `MessageSent`
    /// confirmation. Queued for replay when the channel is not authenticated.
    pub fn send_message(
        &self,
        conversation_id: ConversationId,
        content: impl Into<String>,
        kind: MessageKind,
    ) -> CorrelationId {
        let client_correlation_id = CorrelationId::generate();
        self.inner.emit(OutboundEvent::SendMessage {
            conversation_id,
            content: content.into(),
            kind,
            client_correlation_id,
        });
        client_correlation_id
    }

    /// Signal that the local user is typing
    ///
    /// Emits immediately and arms the expiry timer; calling again re-arms
    /// the timer (and emits again). Expiry or [`stop_typing`] emits the stop
    /// signal exactly once.
    ///
    /// [`stop_typing`]: SyncClient::stop_typing
    pub fn start_typing(&self, conversation_id: ConversationId) {
        self.inner.typing.arm(conversation_id.clone());
        self.inner.emit(OutboundEvent::Typing {
            conversation_id,
            is_typing: true,
        });
    }

    /// Signal that the local user stopped typing
    ///
    /// Idempotent: emits only if a typing timer was live.
    pub fn stop_typing(&self, conversation_id: ConversationId) {
        if self.inner.typing.disarm(&conversation_id) {
            self.inner.emit(OutboundEvent::Typing {
                conversation_id,
                is_typing: false,
            });
        }
    }

    /// Mark messages in a conversation as read
    pub fn mark_read(&self, conversation_id: ConversationId, message_ids: Vec<MessageId>) {
        self.inner.emit(OutboundEvent::MarkRead {
            conversation_id,
            message_ids,
        });
    }

    /// Join a conversation room, leaving the previous one if different
    ///
    /// At most one room is active at a time; rejoining the current room is a
    /// no-op.
    pub fn join_conversation(&self, conversation_id: ConversationId) {
        let previous = {
            let mut current = self.inner.current_conversation.lock();
            if current.as_ref() == Some(&conversation_id) {
                return;
            }
            current.replace(conversation_id.clone())
        };

        if let Some(conversation_id) = previous {
            self.inner
                .emit(OutboundEvent::LeaveConversation { conversation_id });
        }
        self.inner
            .emit(OutboundEvent::JoinConversation { conversation_id });
    }

    /// Leave the active conversation room
    ///
    /// Emits a leave event only if a room was actually joined; a no-op
    /// otherwise.
    pub fn leave_conversation(&self) {
        let left = self.inner.current_conversation.lock().take();
        if let Some(conversation_id) = left {
            self.inner
                .emit(OutboundEvent::LeaveConversation { conversation_id });
        }
    }

    /// Current connection state
    pub fn state(&self) -> ConnectionState {
        self.inner.state()
    }

    /// Watch connection state transitions without polling
    pub fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.inner.state_tx.subscribe()
    }

    /// Subscribe to normalized publications
    pub fn subscribe(&self) -> broadcast::Receiver<Publication> {
        self.inner.bus.subscribe()
    }

    /// Last observed presence for a user, `None` if never observed
    pub fn get_presence(&self, user_id: &UserId) -> Option<PresenceEntry> {
        self.inner.presence.get(user_id)
    }

    /// Last observed presence for several users; unknown users are skipped
    pub fn get_many_presence(&self, user_ids: &[UserId]) -> Vec<PresenceEntry> {
        self.inner.presence.get_many(user_ids)
    }

    /// The active conversation room, if any
    pub fn current_conversation(&self) -> Option<ConversationId> {
        self.inner.current_conversation.lock().clone()
    }

    /// Number of outbound events awaiting an authenticated channel
    pub fn pending_outbound(&self) -> usize {
        self.inner.queue.len()
    }

    /// Whether the heartbeat loop is running
    pub fn heartbeat_active(&self) -> bool {
        self.inner.heartbeat.is_running()
    }
}

impl std::fmt::Debug for SyncClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncClient")
            .field("state", &self.state())
            .field("pending_outbound", &self.pending_outbound())
            .finish()
    }
}

impl ClientInner {
    pub(crate) fn state(&self) -> ConnectionState {
        *self.state_tx.borrow()
    }

    fn set_state(&self, next: ConnectionState) {
        let previous = self.state_tx.send_replace(next);
        if previous != next {
            tracing::debug!(from = %previous, to = %next, "Connection state changed");
            self.bus.publish(Publication::StateChanged(next));
        }
    }

    /// The single outbound chokepoint
    ///
    /// Every higher-level operation lands here: the event is appended to the
    /// queue (subject to its capacity bound) and the flusher is woken when
    /// the channel is authenticated, so immediate sends and replayed backlog
    /// share one FIFO path.
    pub(crate) fn emit(&self, event: OutboundEvent) {
        let name = event.event_name();
        self.queue.enqueue(event);

        if self.state().is_authenticated() {
            self.flush_notify.notify_one();
        } else {
            tracing::debug!(event = name, "Channel not authenticated, event queued");
        }
    }

    /// Wait for the in-flight handshake to settle
    async fn await_authenticated(&self) -> SyncResult<()> {
        let mut state_rx = self.state_tx.subscribe();

        loop {
            match *state_rx.borrow_and_update() {
                ConnectionState::Authenticated => return Ok(()),
                ConnectionState::Error => {
                    return Err(match self.last_error.lock().take() {
                        Some(LastError::Auth(message)) => SyncError::AuthenticationFailed(message),
                        Some(LastError::Transport(message)) => SyncError::Transport(message),
                        None => SyncError::Transport("connection failed".to_string()),
                    });
                }
                _ => {}
            }

            tokio::select! {
                changed = state_rx.changed() => {
                    if changed.is_err() {
                        return Err(SyncError::Cancelled);
                    }
                }
                () = self.connect_abort.notified() => return Err(SyncError::Cancelled),
            }
        }
    }

    async fn run_flusher(inner: Weak<Self>, notify: Arc<Notify>) {
        loop {
            notify.notified().await;
            let Some(inner) = inner.upgrade() else { break };
            inner.flush().await;
        }
    }

    /// Drain the queue strictly front-to-back while authenticated
    ///
    /// An entry is removed only after the transport accepted it; a failed
    /// send or a state change stops the drain with the remainder queued.
    async fn flush(&self) {
        let mut sent = 0usize;

        while self.state().is_authenticated() {
            let Some(message) = self.queue.front() else { break };

            match self
                .transport
                .emit(message.event_name(), message.payload())
                .await
            {
                Ok(()) => {
                    self.queue.pop_front();
                    sent += 1;
                }
                Err(error) => {
                    tracing::warn!(
                        event = message.event_name(),
                        error = %error,
                        remaining = self.queue.len(),
                        "Flush interrupted, entries stay queued"
                    );
                    break;
                }
            }
        }

        if sent > 0 {
            tracing::debug!(sent, remaining = self.queue.len(), "Outbound queue flushed");
        }
    }

    async fn run_typing_expiry(
        inner: Weak<Self>,
        mut expired: mpsc::UnboundedReceiver<ConversationId>,
    ) {
        while let Some(conversation_id) = expired.recv().await {
            let Some(inner) = inner.upgrade() else { break };
            inner.emit(OutboundEvent::Typing {
                conversation_id,
                is_typing: false,
            });
        }
    }

    async fn run_inbound(
        inner: Weak<Self>,
        mut events: mpsc::UnboundedReceiver<TransportEvent>,
    ) {
        while let Some(event) = events.recv().await {
            let Some(inner) = inner.upgrade() else { break };
            inner.handle_transport_event(event);
        }
    }

    fn handle_transport_event(&self, event: TransportEvent) {
        match event {
            TransportEvent::Connected => {
                // covers transport-internal reconnects; the initial dial
                // sets this transition in connect()
                self.set_state(ConnectionState::Connected);
            }
            TransportEvent::Disconnected(reason) => self.on_transport_disconnect(&reason),
            TransportEvent::ConnectError { message } => {
                tracing::warn!(error = %message, "Transport-level reconnect attempt failed");
            }
            TransportEvent::Event { name, payload } => self.handle_wire_event(&name, payload),
        }
    }

    fn on_transport_disconnect(&self, reason: &DisconnectReason) {
        self.heartbeat.stop();
        self.current_conversation.lock().take();
        // the outbound queue intentionally survives: undelivered work is
        // replayed on the next authenticated window

        match reason {
            DisconnectReason::Transient => {
                tracing::info!(%reason, "Transport disconnected, transport-level reconnection proceeds");
                self.set_state(ConnectionState::Disconnected);
            }
            DisconnectReason::ClientInitiated => {
                self.set_state(ConnectionState::Disconnected);
            }
            DisconnectReason::ServerInitiated { message } => {
                tracing::warn!(error = %message, "Server closed the session");
                *self.last_error.lock() = Some(LastError::Transport(message.clone()));
                self.set_state(ConnectionState::Error);
            }
        }
    }

    fn handle_wire_event(&self, name: &str, payload: serde_json::Value) {
        let event = match InboundEvent::from_wire(name, payload) {
            Ok(Some(event)) => event,
            Ok(None) => {
                tracing::debug!(event = name, "Ignoring unknown inbound event");
                return;
            }
            Err(error) => {
                tracing::warn!(event = name, error = %error, "Malformed inbound payload");
                return;
            }
        };

        match event {
            InboundEvent::Authenticated => self.on_authenticated(),
            InboundEvent::AuthError { message } => self.on_auth_error(message),
            InboundEvent::MessageNew(message) => {
                self.bus.publish(Publication::MessageReceived(message));
            }
            InboundEvent::MessageSent(ack) => {
                self.bus.publish(Publication::MessageSent(ack));
            }
            InboundEvent::MessageDelivered(receipt) => {
                self.bus.publish(Publication::MessageDelivered(receipt));
            }
            InboundEvent::MessageRead(receipt) => {
                self.bus.publish(Publication::MessageRead(receipt));
            }
            InboundEvent::Typing(signal) => {
                // split the combined wire event so consumers never
                // special-case the flag
                let publication = if signal.is_typing {
                    Publication::UserTyping {
                        conversation_id: signal.conversation_id,
                        user_id: signal.user_id,
                    }
                } else {
                    Publication::UserStoppedTyping {
                        conversation_id: signal.conversation_id,
                        user_id: signal.user_id,
                    }
                };
                self.bus.publish(publication);
            }
            InboundEvent::Presence(signal) => {
                let publication = self.presence.apply(&signal);
                self.bus.publish(publication);
            }
            InboundEvent::ConversationJoined { conversation_id } => {
                self.bus
                    .publish(Publication::ConversationJoined { conversation_id });
            }
            InboundEvent::ServerError(error) => {
                // republished verbatim; the client does not interpret these
                self.bus.publish(Publication::ServerError(error));
            }
        }
    }

    fn on_authenticated(&self) {
        tracing::info!("Channel authenticated");
        self.set_state(ConnectionState::Authenticated);
        self.heartbeat.start(self.weak_self.clone());
        self.flush_notify.notify_one();
    }

    fn on_auth_error(&self, message: String) {
        tracing::error!(error = %message, "Authentication rejected");
        *self.last_error.lock() = Some(LastError::Auth(message.clone()));
        self.heartbeat.stop();
        self.set_state(ConnectionState::Error);
        self.bus.publish(Publication::AuthError { message });
    }
}

impl Drop for ClientInner {
    fn drop(&mut self) {
        self.heartbeat.stop();
        for task in self.tasks.lock().drain(..) {
            task.abort();
        }
    }
}

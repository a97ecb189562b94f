//! Per-conversation typing timers
//!
//! One live timer per conversation the local user is typing in. Arming again
//! supersedes the previous timer (cancel-on-supersede, tracked by generation),
//! so a stream of keystrokes keeps exactly one expiry pending. Expiry delivers
//! the conversation id on a channel the client drains to emit the stop signal.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use sync_core::ConversationId;

struct TimerEntry {
    generation: u64,
    handle: JoinHandle<()>,
}

/// Arena of per-conversation typing timers
pub struct TypingDebouncer {
    ttl: Duration,
    timers: Mutex<HashMap<ConversationId, TimerEntry>>,
    next_generation: AtomicU64,
    expired_tx: mpsc::UnboundedSender<ConversationId>,
    weak_self: Weak<Self>,
}

impl TypingDebouncer {
    /// Create the debouncer and the expiry channel the owner must drain
    #[must_use]
    pub fn new(ttl: Duration) -> (Arc<Self>, mpsc::UnboundedReceiver<ConversationId>) {
        let (expired_tx, expired_rx) = mpsc::unbounded_channel();

        let debouncer = Arc::new_cyclic(|weak| Self {
            ttl,
            timers: Mutex::new(HashMap::new()),
            next_generation: AtomicU64::new(0),
            expired_tx,
            weak_self: weak.clone(),
        });

        (debouncer, expired_rx)
    }

    /// Arm (or re-arm) the timer for a conversation
    ///
    /// An existing timer is aborted before the fresh one is installed, so
    /// repeated arming only ever leaves one expiry pending.
    pub fn arm(&self, conversation_id: ConversationId) {
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        let handle = tokio::spawn(Self::run_timer(
            self.weak_self.clone(),
            conversation_id.clone(),
            generation,
            self.ttl,
        ));

        let mut timers = self.timers.lock();
        if let Some(previous) = timers.insert(conversation_id, TimerEntry { generation, handle }) {
            previous.handle.abort();
        }
    }

    /// Cancel the timer for a conversation
    ///
    /// Returns whether a timer was live, i.e. whether the caller owes a stop
    /// signal. A second call without an intervening `arm` returns `false`.
    pub fn disarm(&self, conversation_id: &ConversationId) -> bool {
        if let Some(entry) = self.timers.lock().remove(conversation_id) {
            entry.handle.abort();
            true
        } else {
            false
        }
    }

    /// Cancel every live timer, returning the conversations that were typing
    pub fn disarm_all(&self) -> Vec<ConversationId> {
        self.timers
            .lock()
            .drain()
            .map(|(conversation_id, entry)| {
                entry.handle.abort();
                conversation_id
            })
            .collect()
    }

    /// Whether a typing timer is live for the conversation
    pub fn is_typing(&self, conversation_id: &ConversationId) -> bool {
        self.timers.lock().contains_key(conversation_id)
    }

    /// Number of live timers
    pub fn active_count(&self) -> usize {
        self.timers.lock().len()
    }

    async fn run_timer(
        debouncer: Weak<Self>,
        conversation_id: ConversationId,
        generation: u64,
        ttl: Duration,
    ) {
        tokio::time::sleep(ttl).await;

        if let Some(debouncer) = debouncer.upgrade() {
            debouncer.expire(&conversation_id, generation);
        }
    }

    fn expire(&self, conversation_id: &ConversationId, generation: u64) {
        let mut timers = self.timers.lock();

        // A superseding arm or an explicit disarm wins over a stale expiry
        let current = timers.get(conversation_id).map(|entry| entry.generation);
        if current != Some(generation) {
            return;
        }

        timers.remove(conversation_id);
        drop(timers);

        tracing::debug!(conversation_id = %conversation_id, "Typing signal expired");
        self.expired_tx.send(conversation_id.clone()).ok();
    }
}

impl std::fmt::Debug for TypingDebouncer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypingDebouncer")
            .field("ttl", &self.ttl)
            .field("active", &self.active_count())
            .finish()
    }
}

//! Bounded FIFO of not-yet-acknowledged client-originated events
//!
//! Entries are appended on emit and drained strictly front-to-back once the
//! channel is authenticated. At capacity the oldest entry is evicted before
//! appending: newest user intent wins over stale queued signals.

use parking_lot::Mutex;
use std::collections::VecDeque;

use sync_core::OutboundEvent;

/// A queued client-originated event
#[derive(Debug, Clone)]
pub struct QueuedMessage {
    event: OutboundEvent,
    enqueued_at_millis: i64,
}

impl QueuedMessage {
    fn new(event: OutboundEvent) -> Self {
        Self {
            event,
            enqueued_at_millis: chrono::Utc::now().timestamp_millis(),
        }
    }

    /// The wrapped event
    #[inline]
    pub fn event(&self) -> &OutboundEvent {
        &self.event
    }

    /// Wire event name
    #[inline]
    pub fn event_name(&self) -> &'static str {
        self.event.event_name()
    }

    /// Wire payload
    pub fn payload(&self) -> serde_json::Value {
        self.event.to_payload()
    }

    /// Enqueue instant (unix millis)
    #[inline]
    pub fn enqueued_at_millis(&self) -> i64 {
        self.enqueued_at_millis
    }
}

/// Bounded FIFO outbound queue
///
/// Mutated from exactly two paths: the emit chokepoint appends at the back,
/// the single flusher removes from the front. A drained entry is removed only
/// after the transport accepted it, so an interrupted flush leaves the
/// remainder queued in order.
pub struct OutboundQueue {
    capacity: usize,
    entries: Mutex<VecDeque<QueuedMessage>>,
}

impl OutboundQueue {
    /// Create a queue with the given capacity bound (minimum 1)
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    /// Append an event, evicting the oldest entry when at capacity
    pub fn enqueue(&self, event: OutboundEvent) {
        let mut entries = self.entries.lock();

        if entries.len() == self.capacity {
            if let Some(evicted) = entries.pop_front() {
                tracing::warn!(
                    event = evicted.event_name(),
                    capacity = self.capacity,
                    "Outbound queue full, evicting oldest entry"
                );
            }
        }

        entries.push_back(QueuedMessage::new(event));
    }

    /// Peek the front entry without removing it
    pub fn front(&self) -> Option<QueuedMessage> {
        self.entries.lock().front().cloned()
    }

    /// Remove and return the front entry
    pub fn pop_front(&self) -> Option<QueuedMessage> {
        self.entries.lock().pop_front()
    }

    /// Number of queued entries
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether the queue is empty
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// The capacity bound
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl std::fmt::Debug for OutboundQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutboundQueue")
            .field("capacity", &self.capacity)
            .field("len", &self.len())
            .finish()
    }
}

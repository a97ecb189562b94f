//! Process-local publish/subscribe hub
//!
//! Decouples the transport from its consumers: inbound traffic is normalized
//! into [`Publication`] values and fanned out here; the state machine's own
//! transitions are published too, so UI code never polls. Delivery toward a
//! subscriber that stopped draining is lossy (the subscriber observes a lag
//! error), which keeps publishing non-blocking.

use tokio::sync::broadcast;

use sync_core::Publication;

/// Default fan-out channel capacity per subscriber
pub const DEFAULT_BUS_CAPACITY: usize = 256;

/// Typed publish/subscribe hub
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<Publication>,
}

impl EventBus {
    /// Create a bus with the given per-subscriber capacity (minimum 1)
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Publish to all current subscribers
    ///
    /// Publishing with no subscribers is not an error; the publication is
    /// simply dropped.
    pub fn publish(&self, publication: Publication) {
        let kind = publication.kind();

        match self.tx.send(publication) {
            Ok(receivers) => {
                tracing::trace!(kind, receivers, "Publication delivered");
            }
            Err(_) => {
                tracing::trace!(kind, "Publication dropped, no subscribers");
            }
        }
    }

    /// Subscribe to all publications from this point on
    pub fn subscribe(&self) -> broadcast::Receiver<Publication> {
        self.tx.subscribe()
    }

    /// Number of live subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_BUS_CAPACITY)
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

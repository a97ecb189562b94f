//! Application-level heartbeat
//!
//! Emits a presence-refresh event on a fixed cadence while the channel is
//! authenticated. This is an "I am still actively using this session" signal
//! layered above whatever keepalive the transport runs for itself; it is
//! started on reaching `Authenticated` and stopped on any transition away.

use parking_lot::Mutex;
use std::sync::Weak;
use std::time::Duration;
use tokio::task::JoinHandle;

use sync_core::{OutboundEvent, PresenceStatus};

use crate::connection::ClientInner;

/// Periodic presence-refresh emitter
pub struct Heartbeat {
    interval: Duration,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl Heartbeat {
    /// Create a stopped heartbeat with the given cadence
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            handle: Mutex::new(None),
        }
    }

    /// Start the loop; a no-op if it is already running
    pub(crate) fn start(&self, owner: Weak<ClientInner>) {
        let mut handle = self.handle.lock();
        if handle.as_ref().is_some_and(|task| !task.is_finished()) {
            return;
        }

        tracing::debug!(interval_secs = self.interval.as_secs(), "Heartbeat started");
        *handle = Some(tokio::spawn(Self::run(owner, self.interval)));
    }

    /// Stop the loop; a no-op if it is not running
    pub fn stop(&self) {
        if let Some(task) = self.handle.lock().take() {
            task.abort();
            tracing::debug!("Heartbeat stopped");
        }
    }

    /// Whether the loop is currently running
    pub fn is_running(&self) -> bool {
        self.handle
            .lock()
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }

    async fn run(owner: Weak<ClientInner>, interval: Duration) {
        let mut ticker = tokio::time::interval(interval);
        // the first tick completes immediately; the refresh cadence starts
        // one full interval after authentication
        ticker.tick().await;

        loop {
            ticker.tick().await;

            let Some(inner) = owner.upgrade() else { break };
            if !inner.state().is_authenticated() {
                break;
            }

            tracing::trace!("Heartbeat presence refresh");
            inner.emit(OutboundEvent::PresenceRefresh {
                status: PresenceStatus::Online,
            });
        }
    }
}

impl std::fmt::Debug for Heartbeat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Heartbeat")
            .field("interval", &self.interval)
            .field("running", &self.is_running())
            .finish()
    }
}

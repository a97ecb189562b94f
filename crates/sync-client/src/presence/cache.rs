//! In-memory presence cache
//!
//! Read-shared by any number of consumers; written solely from the inbound
//! presence-event path. Lookups never block and never touch the network, so
//! staleness is bounded by the heartbeat interval. Entries are overwritten,
//! never deleted; the map is bounded by the population of users this client
//! has ever observed.

use dashmap::DashMap;

use sync_core::{PresenceEntry, PresenceSignal, Publication, UserId};

/// User-id keyed presence map
#[derive(Default)]
pub struct PresenceCache {
    entries: DashMap<UserId, PresenceEntry>,
}

impl PresenceCache {
    /// Create an empty cache
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply an inbound presence signal, last-writer-wins
    ///
    /// Returns the normalized publication for the bus: `UserOnline`, or
    /// `UserOffline` carrying the server-reported last-seen instant.
    pub fn apply(&self, signal: &PresenceSignal) -> Publication {
        let entry = if signal.status.is_online() {
            PresenceEntry::online(signal.user_id.clone())
        } else {
            PresenceEntry::offline(signal.user_id.clone(), signal.last_seen)
        };

        tracing::trace!(
            user_id = %signal.user_id,
            online = entry.online,
            "Presence updated"
        );

        self.entries.insert(signal.user_id.clone(), entry);

        if signal.status.is_online() {
            Publication::UserOnline {
                user_id: signal.user_id.clone(),
            }
        } else {
            Publication::UserOffline {
                user_id: signal.user_id.clone(),
                last_seen: signal.last_seen,
            }
        }
    }

    /// Last observed presence for a user, `None` if never observed
    pub fn get(&self, user_id: &UserId) -> Option<PresenceEntry> {
        self.entries.get(user_id).map(|entry| entry.value().clone())
    }

    /// Last observed presence for several users; unknown users are skipped
    pub fn get_many(&self, user_ids: &[UserId]) -> Vec<PresenceEntry> {
        user_ids.iter().filter_map(|id| self.get(id)).collect()
    }

    /// Number of users ever observed
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no user has been observed yet
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for PresenceCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PresenceCache")
            .field("entries", &self.entries.len())
            .finish()
    }
}

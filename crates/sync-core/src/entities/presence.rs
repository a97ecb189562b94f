//! Presence entity - a user's last observed online/offline status

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::UserId;

/// Last observed presence for a single user
///
/// `last_seen` is supplied by the server, never derived locally. One entry
/// exists per user ever observed; entries are overwritten, not deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenceEntry {
    pub user_id: UserId,
    pub online: bool,
    pub last_seen: Option<DateTime<Utc>>,
}

impl PresenceEntry {
    /// Create an online entry
    #[must_use]
    pub fn online(user_id: UserId) -> Self {
        Self {
            user_id,
            online: true,
            last_seen: None,
        }
    }

    /// Create an offline entry with the server-reported last-seen instant
    #[must_use]
    pub fn offline(user_id: UserId, last_seen: Option<DateTime<Utc>>) -> Self {
        Self {
            user_id,
            online: false,
            last_seen,
        }
    }
}

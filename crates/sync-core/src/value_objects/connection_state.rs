//! Connection state vocabulary
//!
//! Exactly one [`ConnectionState`] is live at a time; the connection state
//! machine is its sole writer and transitions are the only mutation path.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Connection lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    /// No transport, nothing in flight
    Disconnected,
    /// Dialing the transport
    Connecting,
    /// Transport established, handshake not yet acknowledged
    Connected,
    /// Server accepted the credential; channel ready for traffic
    Authenticated,
    /// Terminal until a fresh `connect()` resets the machine
    Error,
}

impl ConnectionState {
    /// Check whether the channel is ready for application traffic
    #[inline]
    #[must_use]
    pub fn is_authenticated(self) -> bool {
        matches!(self, Self::Authenticated)
    }

    /// Check whether a transport is established (authenticated or not)
    #[inline]
    #[must_use]
    pub fn is_connected(self) -> bool {
        matches!(self, Self::Connected | Self::Authenticated)
    }

    /// Check whether the machine is in its terminal failure state
    #[inline]
    #[must_use]
    pub fn is_error(self) -> bool {
        matches!(self, Self::Error)
    }
}

impl Default for ConnectionState {
    fn default() -> Self {
        Self::Disconnected
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected => write!(f, "disconnected"),
            Self::Connecting => write!(f, "connecting"),
            Self::Connected => write!(f, "connected"),
            Self::Authenticated => write!(f, "authenticated"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Why the transport reported a disconnect
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisconnectReason {
    /// Network turbulence; the transport will retry on its own
    Transient,
    /// Server closed the connection and does not want this session back
    ServerInitiated { message: String },
    /// Local `disconnect()` tore the transport down
    ClientInitiated,
}

impl DisconnectReason {
    /// Whether the transport's own reconnection attempts should proceed
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Transient)
    }
}

impl fmt::Display for DisconnectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transient => write!(f, "transient"),
            Self::ServerInitiated { message } => write!(f, "server-initiated: {message}"),
            Self::ClientInitiated => write!(f, "client-initiated"),
        }
    }
}

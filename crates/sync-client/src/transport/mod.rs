//! Transport abstraction
//!
//! The client treats the underlying channel as a black box exposing named
//! JSON events. A concrete implementation (websocket library, in-memory test
//! double) lives outside this crate; only the seam is defined here.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::mpsc;

use sync_core::{DisconnectReason, SyncError};

use crate::auth::AuthCredential;

/// Lifecycle and traffic events reported by a transport
///
/// The receiver returned by [`Transport::connect`] carries these for the life
/// of the dial, including any transport-internal reconnects (which re-emit
/// `Connected` followed by a fresh handshake outcome from the server).
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    /// The channel (re-)established
    Connected,
    /// The channel dropped
    Disconnected(DisconnectReason),
    /// A transport-internal reconnection attempt failed
    ConnectError { message: String },
    /// A named application event arrived
    Event { name: String, payload: Value },
}

/// Transport failure
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Connect failed: {0}")]
    Connect(String),

    #[error("Send failed: {0}")]
    Send(String),

    #[error("Transport closed")]
    Closed,
}

impl From<TransportError> for SyncError {
    fn from(err: TransportError) -> Self {
        Self::Transport(err.to_string())
    }
}

/// Transport result type
pub type TransportResult<T> = Result<T, TransportError>;

/// A bidirectional event channel
///
/// `connect` attaches the credential at handshake time, never as a
/// post-connect event. Implementations own their own keepalive; the client's
/// heartbeat is layered above it.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Open the channel with the credential attached at handshake time.
    ///
    /// Resolves once the channel is established (before the server's auth
    /// acknowledgment, which arrives on the returned event stream).
    async fn connect(
        &self,
        credential: &AuthCredential,
    ) -> TransportResult<mpsc::UnboundedReceiver<TransportEvent>>;

    /// Emit a named JSON event
    async fn emit(&self, name: &str, payload: Value) -> TransportResult<()>;

    /// Tear the channel down
    async fn disconnect(&self);

    /// Whether the channel currently reports connected
    fn is_connected(&self) -> bool;
}

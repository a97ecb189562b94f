//! Client error taxonomy
//!
//! Transient network turbulence is absorbed and retried internally and never
//! appears here; these are the failures that require caller action.

use thiserror::Error;

/// Errors surfaced to callers of the synchronization client
#[derive(Debug, Error)]
pub enum SyncError {
    /// Server rejected the credential. No silent retry: the caller must
    /// supply a fresh credential and call `connect()` again.
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The reconnection budget was exhausted without reaching an
    /// authenticated channel.
    #[error("Reconnection failed after {attempts} attempts")]
    ReconnectExhausted { attempts: u32 },

    /// The transport reported a failure it could not recover from
    #[error("Transport error: {0}")]
    Transport(String),

    /// An in-flight `connect()` was cancelled by an explicit `disconnect()`
    #[error("Connect cancelled by disconnect")]
    Cancelled,

    /// The credential provider could not supply a token
    #[error("Credential error: {0}")]
    Credential(String),

    /// A wire payload failed to parse
    #[error("Invalid payload: {0}")]
    InvalidPayload(#[from] serde_json::Error),
}

/// Result alias for client operations
pub type SyncResult<T> = Result<T, SyncError>;

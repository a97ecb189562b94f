//! Credentials
//!
//! The client does not manage token lifecycle; a [`CredentialProvider`]
//! supplies the current access token at `connect()` time, and refresh after
//! an auth failure is the caller's responsibility.

use async_trait::async_trait;
use std::fmt;

use sync_core::SyncResult;

/// An opaque access token attached to the transport handshake
#[derive(Clone, PartialEq, Eq)]
pub struct AuthCredential(String);

impl AuthCredential {
    /// Wrap a raw token
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token value
    #[inline]
    pub fn token(&self) -> &str {
        &self.0
    }
}

// Tokens must never end up in logs
impl fmt::Debug for AuthCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthCredential(***)")
    }
}

/// Supplies the current access token at connect time
#[async_trait]
pub trait CredentialProvider: Send + Sync + 'static {
    /// The token to attach to the next handshake
    async fn access_token(&self) -> SyncResult<AuthCredential>;
}

/// A provider that always hands out the same token
///
/// Suitable for tests and for sessions whose token outlives the process.
#[derive(Debug, Clone)]
pub struct StaticCredentials {
    credential: AuthCredential,
}

impl StaticCredentials {
    /// Create from a raw token
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            credential: AuthCredential::new(token),
        }
    }
}

#[async_trait]
impl CredentialProvider for StaticCredentials {
    async fn access_token(&self) -> SyncResult<AuthCredential> {
        Ok(self.credential.clone())
    }
}

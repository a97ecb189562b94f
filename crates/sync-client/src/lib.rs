//! # sync-client
//!
//! Realtime synchronization client for the messaging channel: a connection
//! state machine over a pluggable transport, with an outbound queue that
//! survives disconnects, per-conversation typing debounce, a read-shared
//! presence cache, an application-level heartbeat, and a typed event bus.
//!
//! The transport is a black-box collaborator ([`Transport`]); consumers
//! never touch it directly. All inbound traffic is normalized into
//! [`sync_core::Publication`] values on the bus, and all outbound traffic
//! funnels through the client's single emit chokepoint.
//!
//! ## Example
//!
//! ```ignore
//! use sync_client::{StaticCredentials, SyncClient, SyncConfig};
//! use sync_core::{ConversationId, MessageKind, Publication};
//!
//! let client = SyncClient::new(transport, credentials, SyncConfig::default());
//! let mut events = client.subscribe();
//!
//! client.connect().await?;
//! client.join_conversation(ConversationId::from("c1"));
//! client.send_message(ConversationId::from("c1"), "hello", MessageKind::Text);
//!
//! while let Ok(publication) = events.recv().await {
//!     match publication {
//!         Publication::MessageReceived(message) => { /* … */ }
//!         Publication::StateChanged(state) => { /* … */ }
//!         _ => {}
//!     }
//! }
//! ```

pub mod auth;
pub mod bus;
pub mod config;
pub mod connection;
pub mod heartbeat;
pub mod presence;
pub mod queue;
pub mod telemetry;
pub mod transport;
pub mod typing;

pub use auth::{AuthCredential, CredentialProvider, StaticCredentials};
pub use bus::EventBus;
pub use config::{ConfigError, ReconnectConfig, SyncConfig};
pub use connection::SyncClient;
pub use presence::PresenceCache;
pub use queue::{OutboundQueue, QueuedMessage};
pub use telemetry::{init_tracing, init_tracing_with_config, TracingConfig};
pub use transport::{Transport, TransportError, TransportEvent, TransportResult};
pub use typing::TypingDebouncer;

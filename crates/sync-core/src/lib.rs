//! # sync-core
//!
//! Domain layer for the realtime synchronization client: identifier value
//! objects, entities, connection-state vocabulary, the typed inbound and
//! outbound wire contracts, and the publication union consumers subscribe to.
//! This crate has no dependency on the transport or any runtime machinery.

pub mod entities;
pub mod error;
pub mod events;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{ChatMessage, MessageKind, PresenceEntry};
pub use error::{SyncError, SyncResult};
pub use events::{
    DeliveryReceipt, InboundEvent, MessageSentAck, OutboundEvent, PresenceSignal, PresenceStatus,
    Publication, ReadReceipt, ServerErrorEvent, TypingSignal,
};
pub use value_objects::{
    ConnectionState, ConversationId, CorrelationId, DisconnectReason, MessageId, UserId,
};

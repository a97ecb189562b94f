//! Wire contracts and bus publications
//!
//! `inbound` and `outbound` describe the named JSON events exchanged with the
//! transport; `publication` is the typed union republished on the event bus
//! after normalization.

mod inbound;
mod outbound;
mod publication;

pub use inbound::{
    DeliveryReceipt, InboundEvent, MessageSentAck, PresenceSignal, PresenceStatus, ReadReceipt,
    ServerErrorEvent, TypingSignal,
};
pub use outbound::OutboundEvent;
pub use publication::Publication;

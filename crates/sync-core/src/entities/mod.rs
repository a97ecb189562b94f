//! Entities

mod message;
mod presence;

pub use message::{ChatMessage, MessageKind};
pub use presence::PresenceEntry;

//! Message entity - a chat message as delivered by the server

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{ConversationId, MessageId, UserId};

/// Message content kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    /// Plain text
    Text,
    /// Image attachment
    Image,
    /// Generic file attachment
    File,
    /// Server-generated notice (e.g. "interview scheduled")
    System,
}

impl Default for MessageKind {
    fn default() -> Self {
        Self::Text
    }
}

/// A chat message received over the channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: MessageId,
    pub conversation_id: ConversationId,
    pub sender_id: UserId,
    pub content: String,
    #[serde(default)]
    pub kind: MessageKind,
    pub sent_at: DateTime<Utc>,
}

impl ChatMessage {
    /// Check if message content is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.content.trim().is_empty()
    }

    /// Check if this is a server-generated notice
    #[inline]
    pub fn is_system(&self) -> bool {
        self.kind == MessageKind::System
    }
}

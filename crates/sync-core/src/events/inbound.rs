//! Inbound wire contract
//!
//! Named events the client expects from the transport, parsed from their
//! JSON payloads into typed structs. Unknown names parse to `None` so new
//! server events never break older clients.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::ChatMessage;
use crate::value_objects::{ConversationId, CorrelationId, MessageId, UserId};

/// Wire event names
pub mod names {
    pub const AUTHENTICATED: &str = "authenticated";
    pub const AUTH_ERROR: &str = "auth:error";
    pub const MESSAGE_NEW: &str = "message:new";
    pub const MESSAGE_SENT: &str = "message:sent";
    pub const MESSAGE_DELIVERED: &str = "message:delivered";
    pub const MESSAGE_READ: &str = "message:read";
    pub const TYPING: &str = "typing";
    pub const PRESENCE_UPDATE: &str = "presence:update";
    pub const CONVERSATION_JOINED: &str = "conversation:joined";
    pub const ERROR: &str = "error";
}

/// Presence status as reported by the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresenceStatus {
    Online,
    Offline,
}

impl PresenceStatus {
    #[inline]
    #[must_use]
    pub fn is_online(self) -> bool {
        matches!(self, Self::Online)
    }
}

/// Confirmation that a client-originated message was accepted
///
/// Echoes the correlation ID supplied at send time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageSentAck {
    pub client_correlation_id: CorrelationId,
    pub message_id: MessageId,
    pub conversation_id: ConversationId,
}

/// A message reached a recipient's device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryReceipt {
    pub conversation_id: ConversationId,
    pub message_id: MessageId,
    pub user_id: UserId,
    pub delivered_at: DateTime<Utc>,
}

/// Messages were marked read by a recipient
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadReceipt {
    pub conversation_id: ConversationId,
    pub message_ids: Vec<MessageId>,
    pub user_id: UserId,
    pub read_at: DateTime<Utc>,
}

/// Combined typing signal; split into start/stop publications downstream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypingSignal {
    pub conversation_id: ConversationId,
    pub user_id: UserId,
    pub is_typing: bool,
}

/// Combined presence signal; split into online/offline publications
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenceSignal {
    pub user_id: UserId,
    pub status: PresenceStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_seen: Option<DateTime<Utc>>,
}

/// Generic server-reported error, republished verbatim
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerErrorEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub message: String,
}

/// Auth failure payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthErrorPayload {
    message: String,
}

/// Conversation-joined acknowledgment payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConversationJoinedPayload {
    conversation_id: ConversationId,
}

/// A typed inbound event
#[derive(Debug, Clone, PartialEq)]
pub enum InboundEvent {
    /// Server accepted the credential
    Authenticated,
    /// Server rejected the credential
    AuthError { message: String },
    /// New message in a conversation
    MessageNew(ChatMessage),
    /// Client-originated message accepted
    MessageSent(MessageSentAck),
    /// Delivery receipt
    MessageDelivered(DeliveryReceipt),
    /// Read receipt
    MessageRead(ReadReceipt),
    /// Remote user typing state changed
    Typing(TypingSignal),
    /// Remote user presence changed
    Presence(PresenceSignal),
    /// Conversation join acknowledged
    ConversationJoined { conversation_id: ConversationId },
    /// Generic server error
    ServerError(ServerErrorEvent),
}

impl InboundEvent {
    /// Parse a named wire event into a typed inbound event
    ///
    /// Returns `Ok(None)` for event names this client does not know.
    pub fn from_wire(
        name: &str,
        payload: serde_json::Value,
    ) -> Result<Option<Self>, serde_json::Error> {
        let event = match name {
            names::AUTHENTICATED => Self::Authenticated,
            names::AUTH_ERROR => {
                let p: AuthErrorPayload = serde_json::from_value(payload)?;
                Self::AuthError { message: p.message }
            }
            names::MESSAGE_NEW => Self::MessageNew(serde_json::from_value(payload)?),
            names::MESSAGE_SENT => Self::MessageSent(serde_json::from_value(payload)?),
            names::MESSAGE_DELIVERED => Self::MessageDelivered(serde_json::from_value(payload)?),
            names::MESSAGE_READ => Self::MessageRead(serde_json::from_value(payload)?),
            names::TYPING => Self::Typing(serde_json::from_value(payload)?),
            names::PRESENCE_UPDATE => Self::Presence(serde_json::from_value(payload)?),
            names::CONVERSATION_JOINED => {
                let p: ConversationJoinedPayload = serde_json::from_value(payload)?;
                Self::ConversationJoined {
                    conversation_id: p.conversation_id,
                }
            }
            names::ERROR => Self::ServerError(serde_json::from_value(payload)?),
            _ => return Ok(None),
        };

        Ok(Some(event))
    }
}

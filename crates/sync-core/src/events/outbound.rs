//! Outbound wire contract
//!
//! Every client-originated event funnels through this enum, whether sent
//! immediately or queued for a later authenticated window.

use serde::Serialize;

use crate::entities::MessageKind;
use crate::events::inbound::PresenceStatus;
use crate::value_objects::{ConversationId, CorrelationId, MessageId};

/// Wire event names
pub mod names {
    pub const MESSAGE_SEND: &str = "message:send";
    pub const TYPING: &str = "typing";
    pub const MESSAGE_MARK_READ: &str = "message:mark_read";
    pub const CONVERSATION_JOIN: &str = "conversation:join";
    pub const CONVERSATION_LEAVE: &str = "conversation:leave";
    pub const PRESENCE_REFRESH: &str = "presence:refresh";
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
struct SendMessagePayload<'a> {
    conversation_id: &'a ConversationId,
    content: &'a str,
    kind: MessageKind,
    client_correlation_id: CorrelationId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
struct TypingPayload<'a> {
    conversation_id: &'a ConversationId,
    is_typing: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
struct MarkReadPayload<'a> {
    conversation_id: &'a ConversationId,
    message_ids: &'a [MessageId],
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
struct ConversationPayload<'a> {
    conversation_id: &'a ConversationId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
struct PresenceRefreshPayload {
    status: PresenceStatus,
}

/// A client-originated event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundEvent {
    /// Send a message into a conversation
    SendMessage {
        conversation_id: ConversationId,
        content: String,
        kind: MessageKind,
        client_correlation_id: CorrelationId,
    },
    /// Local typing state changed
    Typing {
        conversation_id: ConversationId,
        is_typing: bool,
    },
    /// Mark messages read
    MarkRead {
        conversation_id: ConversationId,
        message_ids: Vec<MessageId>,
    },
    /// Join a conversation room
    JoinConversation { conversation_id: ConversationId },
    /// Leave a conversation room
    LeaveConversation { conversation_id: ConversationId },
    /// Application-level "still here" presence refresh
    PresenceRefresh { status: PresenceStatus },
}

impl OutboundEvent {
    /// Wire event name for this event
    #[must_use]
    pub const fn event_name(&self) -> &'static str {
        match self {
            Self::SendMessage { .. } => names::MESSAGE_SEND,
            Self::Typing { .. } => names::TYPING,
            Self::MarkRead { .. } => names::MESSAGE_MARK_READ,
            Self::JoinConversation { .. } => names::CONVERSATION_JOIN,
            Self::LeaveConversation { .. } => names::CONVERSATION_LEAVE,
            Self::PresenceRefresh { .. } => names::PRESENCE_REFRESH,
        }
    }

    /// Serialize the JSON payload for the wire
    #[must_use]
    pub fn to_payload(&self) -> serde_json::Value {
        let value = match self {
            Self::SendMessage {
                conversation_id,
                content,
                kind,
                client_correlation_id,
            } => serde_json::to_value(SendMessagePayload {
                conversation_id,
                content,
                kind: *kind,
                client_correlation_id: *client_correlation_id,
            }),
            Self::Typing {
                conversation_id,
                is_typing,
            } => serde_json::to_value(TypingPayload {
                conversation_id,
                is_typing: *is_typing,
            }),
            Self::MarkRead {
                conversation_id,
                message_ids,
            } => serde_json::to_value(MarkReadPayload {
                conversation_id,
                message_ids,
            }),
            Self::JoinConversation { conversation_id }
            | Self::LeaveConversation { conversation_id } => {
                serde_json::to_value(ConversationPayload { conversation_id })
            }
            Self::PresenceRefresh { status } => {
                serde_json::to_value(PresenceRefreshPayload { status: *status })
            }
        };

        value.unwrap_or_default()
    }

    /// Whether this is an ephemeral signal rather than durable user intent
    #[must_use]
    pub fn is_ephemeral(&self) -> bool {
        matches!(self, Self::Typing { .. } | Self::PresenceRefresh { .. })
    }
}

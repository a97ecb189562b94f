//! Bus publications
//!
//! The typed union republished on the event bus after inbound normalization.
//! Combined wire events are split here (typing flag into start/stop, presence
//! status into online/offline) so consumers never special-case wire shapes.

use chrono::{DateTime, Utc};

use crate::entities::ChatMessage;
use crate::events::inbound::{DeliveryReceipt, MessageSentAck, ReadReceipt, ServerErrorEvent};
use crate::value_objects::{ConnectionState, ConversationId, UserId};

/// A normalized publication delivered to bus subscribers
#[derive(Debug, Clone, PartialEq)]
pub enum Publication {
    /// Connection state machine transitioned
    StateChanged(ConnectionState),
    /// New message arrived
    MessageReceived(ChatMessage),
    /// A local send was accepted by the server
    MessageSent(MessageSentAck),
    /// Delivery receipt for a message
    MessageDelivered(DeliveryReceipt),
    /// Read receipt for one or more messages
    MessageRead(ReadReceipt),
    /// Remote user started typing
    UserTyping {
        conversation_id: ConversationId,
        user_id: UserId,
    },
    /// Remote user stopped typing
    UserStoppedTyping {
        conversation_id: ConversationId,
        user_id: UserId,
    },
    /// User came online
    UserOnline { user_id: UserId },
    /// User went offline; `last_seen` is server-reported
    UserOffline {
        user_id: UserId,
        last_seen: Option<DateTime<Utc>>,
    },
    /// Conversation join acknowledged by the server
    ConversationJoined { conversation_id: ConversationId },
    /// Authentication was rejected
    AuthError { message: String },
    /// The reconnection budget was exhausted
    ReconnectFailed { attempts: u32 },
    /// Server-reported error, republished verbatim
    ServerError(ServerErrorEvent),
}

impl Publication {
    /// Short label used in log fields
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::StateChanged(_) => "state_changed",
            Self::MessageReceived(_) => "message_received",
            Self::MessageSent(_) => "message_sent",
            Self::MessageDelivered(_) => "message_delivered",
            Self::MessageRead(_) => "message_read",
            Self::UserTyping { .. } => "user_typing",
            Self::UserStoppedTyping { .. } => "user_stopped_typing",
            Self::UserOnline { .. } => "user_online",
            Self::UserOffline { .. } => "user_offline",
            Self::ConversationJoined { .. } => "conversation_joined",
            Self::AuthError { .. } => "auth_error",
            Self::ReconnectFailed { .. } => "reconnect_failed",
            Self::ServerError(_) => "server_error",
        }
    }
}

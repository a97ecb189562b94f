//! Wire payload builders for inbound events

use serde_json::{json, Value};

/// `message:new` payload
pub fn message_payload(id: &str, conversation: &str, sender: &str, content: &str) -> Value {
    json!({
        "id": id,
        "conversationId": conversation,
        "senderId": sender,
        "content": content,
        "sentAt": "2026-03-01T09:30:00Z"
    })
}

/// `presence:update` payload
pub fn presence_payload(user: &str, online: bool, last_seen: Option<&str>) -> Value {
    let mut payload = json!({
        "userId": user,
        "status": if online { "online" } else { "offline" }
    });
    if let Some(last_seen) = last_seen {
        payload["lastSeen"] = json!(last_seen);
    }
    payload
}

/// `typing` payload (inbound, remote user)
pub fn typing_payload(conversation: &str, user: &str, is_typing: bool) -> Value {
    json!({
        "conversationId": conversation,
        "userId": user,
        "isTyping": is_typing
    })
}

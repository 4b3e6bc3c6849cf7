use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use chat_cell::ChatMessagePayload;

use crate::error::SyncError;

/// Wire frame carried over the event stream in both directions.
#[derive(Debug, Serialize, Deserialize)]
struct Frame {
    event: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

/// Events the backend pushes to a subscribed client.
#[derive(Debug, Clone)]
pub enum LiveEvent {
    /// A single message (or the echo of one of our own sends).
    ChatMessage(ChatMessagePayload),
    /// Coarse "the conversation list changed" signal; payloads on this event
    /// are not reliable, so the receiver refetches the whole list.
    ChatListUpdate,
}

/// Events the client emits.
#[derive(Debug, Clone)]
pub enum OutboundEvent {
    /// Per-user room subscription, sent immediately after connecting.
    JoinRoom { user_id: String },
    ChatMessage(ChatMessagePayload),
}

pub fn decode_event(text: &str) -> Result<LiveEvent, SyncError> {
    let frame: Frame = serde_json::from_str(text)
        .map_err(|e| SyncError::Validation(format!("malformed event frame: {}", e)))?;

    match frame.event.as_str() {
        "chat message" => {
            let data = frame
                .data
                .ok_or_else(|| SyncError::Validation("chat message event without data".into()))?;
            let payload: ChatMessagePayload = serde_json::from_value(data)
                .map_err(|e| SyncError::Validation(format!("malformed chat message: {}", e)))?;
            Ok(LiveEvent::ChatMessage(payload))
        }
        "chatListUpdate" => Ok(LiveEvent::ChatListUpdate),
        other => Err(SyncError::Validation(format!("unknown event: {}", other))),
    }
}

pub fn encode_event(event: &OutboundEvent) -> Result<String, SyncError> {
    let frame = match event {
        OutboundEvent::JoinRoom { user_id } => Frame {
            event: "joinRoom".to_string(),
            data: Some(json!({ "userId": user_id })),
        },
        OutboundEvent::ChatMessage(payload) => Frame {
            event: "chat message".to_string(),
            data: Some(
                serde_json::to_value(payload)
                    .map_err(|e| SyncError::Validation(e.to_string()))?,
            ),
        },
    };

    serde_json::to_string(&frame).map_err(|e| SyncError::Validation(e.to_string()))
}

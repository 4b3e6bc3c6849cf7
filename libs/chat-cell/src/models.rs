use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ChatError;

// ==============================================================================
// CONVERSATION MODELS
// ==============================================================================

/// A conversation is the doctor-patient pair, regardless of who sent what.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ConversationKey {
    pub doctor_id: String,
    pub patient_id: String,
}

impl ConversationKey {
    pub fn new(doctor_id: impl Into<String>, patient_id: impl Into<String>) -> Self {
        Self {
            doctor_id: doctor_id.into(),
            patient_id: patient_id.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SenderRole {
    #[serde(rename = "dokter")]
    Doctor,
    #[serde(rename = "masyarakat")]
    Patient,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum MessageBody {
    Text(String),
    /// Base64-encoded image bytes or a server-side image path.
    Image(String),
}

impl MessageBody {
    pub fn image_from_bytes(bytes: &[u8]) -> Self {
        MessageBody::Image(BASE64.encode(bytes))
    }

    /// One-line preview used by conversation summaries.
    pub fn preview(&self) -> String {
        match self {
            MessageBody::Text(text) => text.clone(),
            MessageBody::Image(_) => "[gambar]".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryState {
    /// Sent over the stream, waiting for the broadcast echo.
    Pending,
    Confirmed,
}

/// One entry in a conversation's append-only log. Entries are never mutated
/// after confirmation; a pending entry is only ever flipped to confirmed when
/// its echo arrives.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub server_id: Option<String>,
    pub client_id: Option<Uuid>,
    pub key: ConversationKey,
    pub sender_id: String,
    pub sender_role: SenderRole,
    pub body: MessageBody,
    pub sent_at: DateTime<Utc>,
    pub delivery: DeliveryState,
}

impl ChatMessage {
    /// Build the doctor's own outbound message with a client-generated id,
    /// pending until the echo confirms it.
    pub fn outbound(key: ConversationKey, body: MessageBody, sent_at: DateTime<Utc>) -> Self {
        let sender_id = key.doctor_id.clone();
        Self {
            server_id: None,
            client_id: Some(Uuid::new_v4()),
            key,
            sender_id,
            sender_role: SenderRole::Doctor,
            body,
            sent_at,
            delivery: DeliveryState::Pending,
        }
    }

    /// Dedup key for events without a server-assigned id.
    pub fn fingerprint(&self) -> (String, DateTime<Utc>, String) {
        (self.sender_id.clone(), self.sent_at, self.body.preview())
    }
}

// ==============================================================================
// WIRE PAYLOADS
// ==============================================================================

/// Shape of a `"chat message"` event and of one `/chat/history` row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessagePayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "clientId", default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub sender: SenderRole,
    #[serde(rename = "senderId")]
    pub sender_id: String,
    #[serde(rename = "receiverId")]
    pub receiver_id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub waktu: DateTime<Utc>,
}

impl ChatMessagePayload {
    /// The doctor side of the pair, whichever direction the message went.
    pub fn conversation_key(&self) -> ConversationKey {
        match self.sender {
            SenderRole::Doctor => ConversationKey::new(&self.sender_id, &self.receiver_id),
            SenderRole::Patient => ConversationKey::new(&self.receiver_id, &self.sender_id),
        }
    }

    pub fn involves(&self, user_id: &str) -> bool {
        self.sender_id == user_id || self.receiver_id == user_id
    }

    /// Validate the duck-typed payload into a typed message; a body that does
    /// not match its declared type is rejected rather than cached.
    pub fn into_message(self) -> Result<ChatMessage, ChatError> {
        let body = match self.kind.as_str() {
            "text" => MessageBody::Text(self.text.clone().ok_or_else(|| {
                ChatError::Validation("text message without text field".to_string())
            })?),
            "image" => MessageBody::Image(self.image.clone().ok_or_else(|| {
                ChatError::Validation("image message without image field".to_string())
            })?),
            other => {
                return Err(ChatError::Validation(format!(
                    "unknown message type: {}",
                    other
                )))
            }
        };

        Ok(ChatMessage {
            server_id: self.id.clone(),
            client_id: self.client_id,
            key: self.conversation_key(),
            sender_id: self.sender_id,
            sender_role: self.sender,
            body,
            sent_at: self.waktu,
            delivery: DeliveryState::Confirmed,
        })
    }

    pub fn from_message(message: &ChatMessage) -> Self {
        let receiver_id = match message.sender_role {
            SenderRole::Doctor => message.key.patient_id.clone(),
            SenderRole::Patient => message.key.doctor_id.clone(),
        };
        let (kind, text, image) = match &message.body {
            MessageBody::Text(t) => ("text", Some(t.clone()), None),
            MessageBody::Image(i) => ("image", None, Some(i.clone())),
        };

        Self {
            id: message.server_id.clone(),
            client_id: message.client_id,
            text,
            image,
            sender: message.sender_role,
            sender_id: message.sender_id.clone(),
            receiver_id,
            kind: kind.to_string(),
            waktu: message.sent_at,
        }
    }
}

/// One row of `GET /chatlist/{userId}`: the peer plus last-activity columns.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatListEntry {
    pub id: String,
    pub nama: String,
    pub foto: Option<String>,
    pub pesan_terakhir: String,
    pub waktu_terakhir: DateTime<Utc>,
}

// ==============================================================================
// CONVERSATION SUMMARIES
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    pub id: String,
    pub name: String,
    pub photo: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConversationSummary {
    pub key: ConversationKey,
    pub participant: Participant,
    pub last_message: String,
    pub last_message_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversationBucket {
    /// Last activity within one day, boundary inclusive.
    Ongoing,
    Closed,
}

impl ConversationSummary {
    pub fn from_entry(doctor_id: &str, entry: ChatListEntry) -> Self {
        Self {
            key: ConversationKey::new(doctor_id, &entry.id),
            participant: Participant {
                id: entry.id,
                name: entry.nama,
                photo: entry.foto,
            },
            last_message: entry.pesan_terakhir,
            last_message_at: entry.waktu_terakhir,
        }
    }

    /// Pure function of (`last_message_at`, `now`): recomputing with the same
    /// inputs always yields the same bucket.
    pub fn bucket(&self, now: DateTime<Utc>) -> ConversationBucket {
        if now - self.last_message_at <= Duration::days(1) {
            ConversationBucket::Ongoing
        } else {
            ConversationBucket::Closed
        }
    }
}

//! Payload structs for gateway events
//!
//! Field names follow the JS clients (camelCase). Ids are strings on the wire.

use buddylink_core::entities::{Message, PresenceStatus};
use buddylink_core::Snowflake;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============================================================================
// Presence
// ============================================================================

/// `buddy:status`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuddyStatusEvent {
    pub user_id: Snowflake,
    pub username: String,
    pub status: PresenceStatus,
}

/// `session:replaced`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionReplacedEvent {
    /// The connection that took over
    pub connection_id: String,
}

// ============================================================================
// Instant messages
// ============================================================================

/// `im:sent` / `im:new`, and the items of `im:history`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImEvent {
    pub id: Snowflake,
    pub from: Snowflake,
    pub to: Snowflake,
    pub message: String,
    #[serde(default, rename = "attachmentIds", skip_serializing_if = "Vec::is_empty")]
    pub attachment_ids: Vec<Snowflake>,
    pub timestamp: DateTime<Utc>,
}

impl From<&Message> for ImEvent {
    fn from(message: &Message) -> Self {
        Self {
            id: message.id,
            from: message.from_user_id,
            to: message.to_user_id,
            message: message.content.clone(),
            attachment_ids: message.attachment_ids.clone(),
            timestamp: message.created_at,
        }
    }
}

/// `im:history` response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImHistoryEvent {
    /// Peer username as the client asked for it
    pub with: String,
    pub messages: Vec<ImEvent>,
}

/// `im:error` / `webrtc:error`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEvent {
    pub error: String,
}

impl ErrorEvent {
    pub fn new(error: impl Into<String>) -> Self {
        Self { error: error.into() }
    }
}

// ============================================================================
// Signaling
// ============================================================================

/// Client `webrtc:offer`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferRequest {
    /// Target username
    pub to: String,
    pub offer: Value,
    pub file_name: String,
    pub file_size: u64,
    #[serde(default = "default_mime_type")]
    pub mime_type: String,
}

fn default_mime_type() -> String {
    "application/octet-stream".to_string()
}

/// Client `webrtc:answer`
#[derive(Debug, Clone, Deserialize)]
pub struct AnswerRequest {
    /// Target connection id, taken from the offer's `fromSocketId`
    pub to: String,
    pub answer: Value,
}

/// Client `webrtc:ice-candidate`
#[derive(Debug, Clone, Deserialize)]
pub struct IceCandidateRequest {
    /// Target connection id
    pub to: String,
    pub candidate: Value,
}

/// Relayed `webrtc:offer`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebRtcOfferEvent {
    pub from: Snowflake,
    pub from_username: String,
    pub from_socket_id: String,
    pub offer: Value,
    pub file_name: String,
    pub file_size: u64,
    pub mime_type: String,
}

/// Relayed `webrtc:answer`; `from` is the answering connection id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebRtcAnswerEvent {
    pub from: String,
    pub answer: Value,
}

/// Relayed `webrtc:ice-candidate`; `from` is the sending connection id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebRtcIceCandidateEvent {
    pub from: String,
    pub candidate: Value,
}

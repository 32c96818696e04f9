//! Request DTOs for client events

use buddylink_core::Snowflake;
use serde::Deserialize;
use validator::{Validate, ValidationErrors};

/// `im:send` payload
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    /// Recipient username
    #[validate(length(min = 1, max = 32, message = "Recipient must be 1-32 characters"))]
    pub to: String,

    #[serde(default)]
    pub message: String,

    #[serde(default)]
    #[validate(length(max = 10, message = "At most 10 attachments per message"))]
    pub attachment_ids: Vec<Snowflake>,
}

/// `im:history` payload
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct HistoryRequest {
    /// Peer username
    #[validate(length(min = 1, max = 32, message = "Peer username must be 1-32 characters"))]
    pub with: String,

    pub before: Option<Snowflake>,

    pub limit: Option<u32>,
}

/// `status:update` payload
///
/// The status stays a string here; an unknown value is dropped by the
/// gateway rather than failing the frame decode.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: String,
}

/// First human-readable message out of a validation failure
pub fn validation_message(errors: &ValidationErrors) -> String {
    errors
        .field_errors()
        .values()
        .flat_map(|errs| errs.iter())
        .find_map(|e| e.message.as_ref().map(ToString::to_string))
        .unwrap_or_else(|| "Invalid request".to_string())
}

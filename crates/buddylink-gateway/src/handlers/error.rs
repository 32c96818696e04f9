//! Handler error types
//!
//! Errors here end the connection. Rejections a client can recover from
//! (`im:error`, `webrtc:error`) are sent as events by the handlers instead.

use crate::protocol::CloseCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HandlerError {
    /// Envelope or payload did not decode
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    /// Event name not recognised
    #[error("Unknown event: {0}")]
    UnknownEvent(String),

    #[error("Service error: {0}")]
    ServiceError(#[from] buddylink_service::ServiceError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl HandlerError {
    pub fn to_close_code(&self) -> CloseCode {
        match self {
            Self::InvalidPayload(_) => CloseCode::DecodeError,
            Self::UnknownEvent(_) => CloseCode::UnknownEvent,
            Self::ServiceError(_) | Self::Internal(_) => CloseCode::UnknownError,
        }
    }
}

impl From<serde_json::Error> for HandlerError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidPayload(err.to_string())
    }
}

pub type HandlerResult<T> = Result<T, HandlerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_close_codes() {
        let decode: HandlerError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert_eq!(decode.to_close_code(), CloseCode::DecodeError);
        assert_eq!(
            HandlerError::UnknownEvent("x".to_string()).to_close_code(),
            CloseCode::UnknownEvent
        );
        assert_eq!(
            HandlerError::Internal("x".to_string()).to_close_code(),
            CloseCode::UnknownError
        );
    }
}

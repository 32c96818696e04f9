//! Domain errors - error types for the domain layer

use thiserror::Error;

use crate::value_objects::Snowflake;

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("User not found: {0}")]
    UserNotFound(Snowflake),

    #[error("Unknown username: {0}")]
    UsernameNotFound(String),

    #[error("Attachment not found: {0}")]
    AttachmentNotFound(Snowflake),

    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Content too long: max {max} characters")]
    ContentTooLong { max: usize },

    // =========================================================================
    // Authorization Errors
    // =========================================================================
    #[error("Cannot send a message to yourself")]
    SelfSend,

    #[error("Messaging is blocked between these users")]
    Blocked,

    #[error("You can only message mutual buddies")]
    NotBuddies,

    #[error("Attachment {0} does not belong to the sender")]
    AttachmentNotOwned(Snowflake),

    // =========================================================================
    // Infrastructure Errors (wrapped)
    // =========================================================================
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    /// Error code string for wire responses and logs
    pub fn code(&self) -> &'static str {
        match self {
            Self::UserNotFound(_) | Self::UsernameNotFound(_) => "UNKNOWN_USER",
            Self::AttachmentNotFound(_) => "UNKNOWN_ATTACHMENT",
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::ContentTooLong { .. } => "CONTENT_TOO_LONG",
            Self::SelfSend => "SELF_SEND",
            Self::Blocked => "BLOCKED",
            Self::NotBuddies => "NOT_BUDDIES",
            Self::AttachmentNotOwned(_) => "INVALID_ATTACHMENT",
            Self::DatabaseError(_) => "DATABASE_ERROR",
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::UserNotFound(_) | Self::UsernameNotFound(_) | Self::AttachmentNotFound(_)
        )
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::ValidationError(_) | Self::ContentTooLong { .. })
    }

    pub fn is_authorization(&self) -> bool {
        matches!(
            self,
            Self::SelfSend | Self::Blocked | Self::NotBuddies | Self::AttachmentNotOwned(_)
        )
    }

    /// Storage or internal failure whose detail must not reach clients
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::DatabaseError(_) | Self::InternalError(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(DomainError::NotBuddies.code(), "NOT_BUDDIES");
        assert_eq!(
            DomainError::AttachmentNotOwned(Snowflake::new(1)).code(),
            "INVALID_ATTACHMENT"
        );
        assert_eq!(
            DomainError::UsernameNotFound("bob".to_string()).code(),
            "UNKNOWN_USER"
        );
    }

    #[test]
    fn test_classification() {
        assert!(DomainError::Blocked.is_authorization());
        assert!(DomainError::UserNotFound(Snowflake::new(1)).is_not_found());
        assert!(DomainError::ContentTooLong { max: 10 }.is_validation());
        assert!(DomainError::DatabaseError("boom".to_string()).is_transient());
        assert!(!DomainError::SelfSend.is_transient());
    }

    #[test]
    fn test_error_display() {
        let err = DomainError::ContentTooLong { max: 2000 };
        assert_eq!(err.to_string(), "Content too long: max 2000 characters");
    }
}

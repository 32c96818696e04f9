//! Service layer error type
//!
//! Carries the full cause for logs. What a client is allowed to see comes
//! from [`ServiceError::client_message`].

use buddylink_core::DomainError;
use std::fmt;

#[derive(Debug)]
pub enum ServiceError {
    /// Domain rule violation or wrapped store failure
    Domain(DomainError),

    /// Resource not found
    NotFound { resource: &'static str, id: String },

    /// Input rejected before any lookup
    Validation(String),

    /// Internal error
    Internal(String),
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Domain(e) => write!(f, "{e}"),
            Self::NotFound { resource, id } => write!(f, "{resource} not found: {id}"),
            Self::Validation(msg) => write!(f, "Validation error: {msg}"),
            Self::Internal(msg) => write!(f, "Internal error: {msg}"),
        }
    }
}

impl std::error::Error for ServiceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Domain(e) => Some(e),
            _ => None,
        }
    }
}

impl ServiceError {
    pub fn not_found(resource: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource,
            id: id.into(),
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Storage or internal failure
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Domain(e) => e.is_transient(),
            Self::Internal(_) => true,
            _ => false,
        }
    }

    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Domain(e) => e.is_not_found() && !self.is_invalid_attachment(),
            Self::NotFound { .. } => true,
            _ => false,
        }
    }

    pub fn is_invalid_attachment(&self) -> bool {
        matches!(
            self,
            Self::Domain(DomainError::AttachmentNotFound(_) | DomainError::AttachmentNotOwned(_))
        )
    }

    /// Error code for logs and tests
    pub fn error_code(&self) -> &str {
        match self {
            _ if self.is_invalid_attachment() => "INVALID_ATTACHMENT",
            Self::Domain(e) => e.code(),
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Reason shown to the initiating connection
    ///
    /// Store and internal failures collapse to `generic`; their detail stays
    /// in the logs.
    pub fn client_message(&self, generic: &str) -> String {
        if self.is_transient() {
            return generic.to_string();
        }
        if self.is_invalid_attachment() {
            return "Invalid attachment".to_string();
        }
        match self {
            Self::Domain(DomainError::UserNotFound(_) | DomainError::UsernameNotFound(_))
            | Self::NotFound { .. } => "User not found".to_string(),
            Self::Domain(DomainError::ValidationError(msg)) | Self::Validation(msg) => msg.clone(),
            Self::Domain(e) => e.to_string(),
            Self::Internal(_) => generic.to_string(),
        }
    }
}

impl From<DomainError> for ServiceError {
    fn from(err: DomainError) -> Self {
        Self::Domain(err)
    }
}

/// Result type for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;

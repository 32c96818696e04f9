//! Application error types
//!
//! Errors that surface at process level: startup, configuration, wiring.

use buddylink_core::DomainError;

use crate::config::ConfigError;

/// Application-wide error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Failed to bind {addr}: {reason}")]
    Bind { addr: String, reason: String },

    #[error("Server error: {0}")]
    Server(String),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Internal error")]
    Internal(#[source] anyhow::Error),
}

impl AppError {
    /// Error code for logs
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Config(_) => "CONFIG_ERROR",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Bind { .. } => "BIND_ERROR",
            Self::Server(_) => "SERVER_ERROR",
            Self::Domain(e) => e.code(),
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err)
    }
}

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_conversion() {
        let err: AppError = ConfigError::MissingVar("GATEWAY_PORT").into();
        assert_eq!(err.error_code(), "CONFIG_ERROR");
        assert!(err.to_string().contains("GATEWAY_PORT"));
    }

    #[test]
    fn test_domain_error_is_transparent() {
        let err: AppError = DomainError::NotBuddies.into();
        assert_eq!(err.error_code(), "NOT_BUDDIES");
        assert_eq!(err.to_string(), DomainError::NotBuddies.to_string());
    }
}

//! Error handling utilities for repositories

use buddylink_core::error::DomainError;
use buddylink_core::value_objects::Snowflake;
use sqlx::Error as SqlxError;

/// Convert SQLx error to DomainError
pub fn map_db_error(e: SqlxError) -> DomainError {
    DomainError::DatabaseError(e.to_string())
}

pub fn user_not_found(id: Snowflake) -> DomainError {
    DomainError::UserNotFound(id)
}

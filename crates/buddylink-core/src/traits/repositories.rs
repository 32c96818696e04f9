//! Repository traits (ports) - the external collaborators of the presence core
//!
//! The domain layer defines what it needs; `buddylink-db` provides the
//! PostgreSQL and in-memory implementations.

use async_trait::async_trait;

use crate::entities::{Attachment, Message, PresenceStatus, User};
use crate::error::DomainError;
use crate::value_objects::Snowflake;

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

// ============================================================================
// User Repository
// ============================================================================

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<User>>;

    /// Case-insensitive username lookup
    async fn find_by_username(&self, username: &str) -> RepoResult<Option<User>>;

    /// Persist the presence column (and `last_seen` when going offline)
    async fn set_status(&self, id: Snowflake, status: PresenceStatus) -> RepoResult<()>;
}

// ============================================================================
// Relationship Repository
// ============================================================================

/// Buddy and block edges, read-only to this core
#[async_trait]
pub trait RelationshipRepository: Send + Sync {
    /// Whether `user_id` has an accepted buddy edge towards `buddy_id`
    async fn has_buddy(&self, user_id: Snowflake, buddy_id: Snowflake) -> RepoResult<bool>;

    /// Whether `blocker_id` has blocked `blocked_id`
    async fn has_blocked(&self, blocker_id: Snowflake, blocked_id: Snowflake) -> RepoResult<bool>;

    /// Users with an accepted edge in both directions
    async fn mutual_buddies(&self, user_id: Snowflake) -> RepoResult<Vec<User>>;
}

// ============================================================================
// Message Repository
// ============================================================================

/// Pagination for thread queries
#[derive(Debug, Clone, Copy)]
pub struct ThreadQuery {
    /// Only messages with an id lower than this
    pub before: Option<Snowflake>,
    pub limit: u32,
}

impl ThreadQuery {
    pub const DEFAULT_LIMIT: u32 = 50;
    pub const MAX_LIMIT: u32 = 100;

    pub fn new(before: Option<Snowflake>, limit: Option<u32>) -> Self {
        Self {
            before,
            limit: limit
                .unwrap_or(Self::DEFAULT_LIMIT)
                .clamp(1, Self::MAX_LIMIT),
        }
    }
}

impl Default for ThreadQuery {
    fn default() -> Self {
        Self::new(None, None)
    }
}

#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Persist a message and link its `attachment_ids` to it as one unit
    async fn create(&self, message: &Message) -> RepoResult<()>;

    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Message>>;

    /// Non-deleted instant messages between two users, newest first
    async fn find_thread(
        &self,
        user_a: Snowflake,
        user_b: Snowflake,
        query: ThreadQuery,
    ) -> RepoResult<Vec<Message>>;
}

// ============================================================================
// Attachment Repository
// ============================================================================

#[async_trait]
pub trait AttachmentRepository: Send + Sync {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Attachment>>;
}

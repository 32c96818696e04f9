//! Service context - dependency container for services
//!
//! Holds the repository ports, the id generator and messaging settings.

use std::sync::Arc;

use buddylink_common::MessagingConfig;
use buddylink_core::traits::{
    AttachmentRepository, MessageRepository, RelationshipRepository, UserRepository,
};
use buddylink_core::{Snowflake, SnowflakeGenerator};
use buddylink_db::{
    MemoryStore, PgAttachmentRepository, PgMessageRepository, PgPool, PgRelationshipRepository,
    PgUserRepository,
};

use super::error::{ServiceError, ServiceResult};

/// Service context containing all dependencies
#[derive(Clone)]
pub struct ServiceContext {
    user_repo: Arc<dyn UserRepository>,
    relationship_repo: Arc<dyn RelationshipRepository>,
    message_repo: Arc<dyn MessageRepository>,
    attachment_repo: Arc<dyn AttachmentRepository>,
    snowflake_generator: Arc<SnowflakeGenerator>,
    messaging: MessagingConfig,
}

impl ServiceContext {
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        relationship_repo: Arc<dyn RelationshipRepository>,
        message_repo: Arc<dyn MessageRepository>,
        attachment_repo: Arc<dyn AttachmentRepository>,
        snowflake_generator: Arc<SnowflakeGenerator>,
        messaging: MessagingConfig,
    ) -> Self {
        Self {
            user_repo,
            relationship_repo,
            message_repo,
            attachment_repo,
            snowflake_generator,
            messaging,
        }
    }

    /// Every port backed by PostgreSQL
    pub fn postgres(pool: PgPool, worker_id: u16, messaging: MessagingConfig) -> Self {
        Self::new(
            Arc::new(PgUserRepository::new(pool.clone())),
            Arc::new(PgRelationshipRepository::new(pool.clone())),
            Arc::new(PgMessageRepository::new(pool.clone())),
            Arc::new(PgAttachmentRepository::new(pool)),
            Arc::new(SnowflakeGenerator::new(worker_id)),
            messaging,
        )
    }

    /// Every port backed by one in-memory store
    pub fn in_memory(store: Arc<MemoryStore>, worker_id: u16, messaging: MessagingConfig) -> Self {
        Self::new(
            store.clone(),
            store.clone(),
            store.clone(),
            store,
            Arc::new(SnowflakeGenerator::new(worker_id)),
            messaging,
        )
    }

    // === Repositories ===

    pub fn user_repo(&self) -> &dyn UserRepository {
        self.user_repo.as_ref()
    }

    pub fn relationship_repo(&self) -> &dyn RelationshipRepository {
        self.relationship_repo.as_ref()
    }

    pub fn message_repo(&self) -> &dyn MessageRepository {
        self.message_repo.as_ref()
    }

    pub fn attachment_repo(&self) -> &dyn AttachmentRepository {
        self.attachment_repo.as_ref()
    }

    // === Settings ===

    pub fn messaging(&self) -> &MessagingConfig {
        &self.messaging
    }

    /// Generate a new Snowflake ID
    pub fn generate_id(&self) -> Snowflake {
        self.snowflake_generator.generate()
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("repositories", &"...")
            .field("messaging", &self.messaging)
            .finish()
    }
}

/// Builder for wiring a ServiceContext port by port
#[derive(Default)]
pub struct ServiceContextBuilder {
    user_repo: Option<Arc<dyn UserRepository>>,
    relationship_repo: Option<Arc<dyn RelationshipRepository>>,
    message_repo: Option<Arc<dyn MessageRepository>>,
    attachment_repo: Option<Arc<dyn AttachmentRepository>>,
    snowflake_generator: Option<Arc<SnowflakeGenerator>>,
    messaging: Option<MessagingConfig>,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user_repo(mut self, repo: Arc<dyn UserRepository>) -> Self {
        self.user_repo = Some(repo);
        self
    }

    pub fn relationship_repo(mut self, repo: Arc<dyn RelationshipRepository>) -> Self {
        self.relationship_repo = Some(repo);
        self
    }

    pub fn message_repo(mut self, repo: Arc<dyn MessageRepository>) -> Self {
        self.message_repo = Some(repo);
        self
    }

    pub fn attachment_repo(mut self, repo: Arc<dyn AttachmentRepository>) -> Self {
        self.attachment_repo = Some(repo);
        self
    }

    pub fn snowflake_generator(mut self, generator: Arc<SnowflakeGenerator>) -> Self {
        self.snowflake_generator = Some(generator);
        self
    }

    pub fn messaging(mut self, config: MessagingConfig) -> Self {
        self.messaging = Some(config);
        self
    }

    /// Build the ServiceContext
    ///
    /// The generator and messaging settings fall back to their defaults.
    ///
    /// # Errors
    /// Returns `ServiceError::Validation` if a repository is missing
    pub fn build(self) -> ServiceResult<ServiceContext> {
        Ok(ServiceContext::new(
            self.user_repo
                .ok_or_else(|| ServiceError::validation("user_repo is required"))?,
            self.relationship_repo
                .ok_or_else(|| ServiceError::validation("relationship_repo is required"))?,
            self.message_repo
                .ok_or_else(|| ServiceError::validation("message_repo is required"))?,
            self.attachment_repo
                .ok_or_else(|| ServiceError::validation("attachment_repo is required"))?,
            self.snowflake_generator.unwrap_or_default(),
            self.messaging.unwrap_or_default(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_requires_repositories() {
        let err = ServiceContextBuilder::new().build().unwrap_err();
        assert!(err.to_string().contains("user_repo"));
    }

    #[test]
    fn test_builder_with_memory_store() {
        let store = Arc::new(MemoryStore::new());
        let ctx = ServiceContextBuilder::new()
            .user_repo(store.clone())
            .relationship_repo(store.clone())
            .message_repo(store.clone())
            .attachment_repo(store)
            .build()
            .unwrap();

        assert_eq!(ctx.messaging().max_length, 2000);
        assert!(ctx.generate_id() < ctx.generate_id());
    }
}

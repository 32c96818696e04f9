//! PostgreSQL implementation of AttachmentRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use buddylink_core::entities::Attachment;
use buddylink_core::traits::{AttachmentRepository, RepoResult};
use buddylink_core::value_objects::Snowflake;

use crate::models::AttachmentModel;

use super::error::map_db_error;

#[derive(Clone)]
pub struct PgAttachmentRepository {
    pool: PgPool,
}

impl PgAttachmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AttachmentRepository for PgAttachmentRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Attachment>> {
        let result = sqlx::query_as::<_, AttachmentModel>(
            r#"
            SELECT id, owner_id, message_id, file_name, mime_type, size
            FROM attachments
            WHERE id = $1
            "#,
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Attachment::from))
    }
}

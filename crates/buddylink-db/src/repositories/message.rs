//! PostgreSQL implementation of MessageRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use buddylink_core::entities::Message;
use buddylink_core::error::DomainError;
use buddylink_core::traits::{MessageRepository, RepoResult, ThreadQuery};
use buddylink_core::value_objects::Snowflake;

use crate::models::MessageModel;

use super::error::map_db_error;

#[derive(Clone)]
pub struct PgMessageRepository {
    pool: PgPool,
}

impl PgMessageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageRepository for PgMessageRepository {
    #[instrument(skip(self, message), fields(message_id = %message.id))]
    async fn create(&self, message: &Message) -> RepoResult<()> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        sqlx::query(
            r#"
            INSERT INTO messages (id, from_user_id, to_user_id, content, kind, created_at, deleted)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(message.id.into_inner())
        .bind(message.from_user_id.into_inner())
        .bind(message.to_user_id.into_inner())
        .bind(&message.content)
        .bind(message.kind.as_str())
        .bind(message.created_at)
        .bind(message.deleted)
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        if message.has_attachments() {
            let ids: Vec<i64> = message.attachment_ids.iter().map(|id| id.into_inner()).collect();

            let linked = sqlx::query(
                r#"
                UPDATE attachments
                SET message_id = $1
                WHERE id = ANY($2) AND owner_id = $3 AND message_id IS NULL
                "#,
            )
            .bind(message.id.into_inner())
            .bind(&ids)
            .bind(message.from_user_id.into_inner())
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;

            // Dropping the transaction rolls the message insert back
            if linked.rows_affected() != ids.len() as u64 {
                return Err(DomainError::ValidationError(
                    "attachments could not be linked".to_string(),
                ));
            }
        }

        tx.commit().await.map_err(map_db_error)?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Message>> {
        let result = sqlx::query_as::<_, MessageModel>(
            r#"
            SELECT m.id, m.from_user_id, m.to_user_id, m.content, m.kind, m.created_at, m.deleted,
                   ARRAY(SELECT a.id FROM attachments a WHERE a.message_id = m.id ORDER BY a.id) AS attachment_ids
            FROM messages m
            WHERE m.id = $1
            "#,
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Message::from))
    }

    #[instrument(skip(self))]
    async fn find_thread(
        &self,
        user_a: Snowflake,
        user_b: Snowflake,
        query: ThreadQuery,
    ) -> RepoResult<Vec<Message>> {
        let limit = i64::from(query.limit);

        // A NULL cursor means "from the newest message"
        let results = sqlx::query_as::<_, MessageModel>(
            r#"
            SELECT m.id, m.from_user_id, m.to_user_id, m.content, m.kind, m.created_at, m.deleted,
                   ARRAY(SELECT a.id FROM attachments a WHERE a.message_id = m.id ORDER BY a.id) AS attachment_ids
            FROM messages m
            WHERE ((m.from_user_id = $1 AND m.to_user_id = $2)
                OR (m.from_user_id = $2 AND m.to_user_id = $1))
              AND m.kind = 'im'
              AND NOT m.deleted
              AND ($3::BIGINT IS NULL OR m.id < $3)
            ORDER BY m.id DESC
            LIMIT $4
            "#,
        )
        .bind(user_a.into_inner())
        .bind(user_b.into_inner())
        .bind(query.before.map(Snowflake::into_inner))
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Message::from).collect())
    }
}

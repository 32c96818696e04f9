//! PostgreSQL implementation of RelationshipRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use buddylink_core::entities::User;
use buddylink_core::traits::{RelationshipRepository, RepoResult};
use buddylink_core::value_objects::Snowflake;

use crate::models::UserModel;

use super::error::map_db_error;

/// Reads the `buddies` and `blocks` tables
#[derive(Clone)]
pub struct PgRelationshipRepository {
    pool: PgPool,
}

impl PgRelationshipRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RelationshipRepository for PgRelationshipRepository {
    #[instrument(skip(self))]
    async fn has_buddy(&self, user_id: Snowflake, buddy_id: Snowflake) -> RepoResult<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM buddies
                WHERE user_id = $1 AND buddy_id = $2 AND accepted
            )
            "#,
        )
        .bind(user_id.into_inner())
        .bind(buddy_id.into_inner())
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(exists)
    }

    #[instrument(skip(self))]
    async fn has_blocked(&self, blocker_id: Snowflake, blocked_id: Snowflake) -> RepoResult<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM blocks
                WHERE blocker_id = $1 AND blocked_id = $2
            )
            "#,
        )
        .bind(blocker_id.into_inner())
        .bind(blocked_id.into_inner())
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(exists)
    }

    #[instrument(skip(self))]
    async fn mutual_buddies(&self, user_id: Snowflake) -> RepoResult<Vec<User>> {
        let results = sqlx::query_as::<_, UserModel>(
            r#"
            SELECT u.id, u.username, u.status, u.last_seen
            FROM buddies forward
            INNER JOIN buddies back
                ON back.user_id = forward.buddy_id
               AND back.buddy_id = forward.user_id
               AND back.accepted
            INNER JOIN users u ON u.id = forward.buddy_id
            WHERE forward.user_id = $1 AND forward.accepted
            ORDER BY u.id
            "#,
        )
        .bind(user_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(User::from).collect())
    }
}

//! PostgreSQL implementation of UserRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use buddylink_core::entities::{PresenceStatus, User};
use buddylink_core::traits::{RepoResult, UserRepository};
use buddylink_core::value_objects::Snowflake;

use crate::models::UserModel;

use super::error::{map_db_error, user_not_found};

#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<User>> {
        let result = sqlx::query_as::<_, UserModel>(
            r#"
            SELECT id, username, status, last_seen
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(User::from))
    }

    #[instrument(skip(self))]
    async fn find_by_username(&self, username: &str) -> RepoResult<Option<User>> {
        let result = sqlx::query_as::<_, UserModel>(
            r#"
            SELECT id, username, status, last_seen
            FROM users
            WHERE LOWER(username) = LOWER($1)
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(User::from))
    }

    #[instrument(skip(self))]
    async fn set_status(&self, id: Snowflake, status: PresenceStatus) -> RepoResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET status = $2,
                last_seen = CASE WHEN $2 = 'offline' THEN NOW() ELSE last_seen END
            WHERE id = $1
            "#,
        )
        .bind(id.into_inner())
        .bind(status.as_str())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(user_not_found(id));
        }

        Ok(())
    }
}

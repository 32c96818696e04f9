//! User row

use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct UserModel {
    pub id: i64,
    pub username: String,
    pub status: String,
    pub last_seen: Option<DateTime<Utc>>,
}
